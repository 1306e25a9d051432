//! `commands` domain: binary command protocols.
//!
//! Produces a C header, Python dataclasses and Markdown docs from a list of
//! commands with typed arguments. Argument types use `struct` format codes.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use embgen_core::{
    application::ports::Filesystem,
    domain::{
        BaseConfig, Document, Domain, DomainError, EmbeddedTemplate, TemplateLocation,
        ValidatedConfig, ValidationError, copy_companion,
    },
    error::EmbgenResult,
};

use super::{EnumValue, into_data, parse};

static TEMPLATES: &[EmbeddedTemplate] = &[
    EmbeddedTemplate {
        name: "template.h.j2",
        source: include_str!("../../templates/commands/template.h.j2"),
    },
    EmbeddedTemplate {
        name: "template.py.j2",
        source: include_str!("../../templates/commands/template.py.j2"),
    },
    EmbeddedTemplate {
        name: "template.md.j2",
        source: include_str!("../../templates/commands/template.md.j2"),
    },
    EmbeddedTemplate {
        name: "commands_base.py",
        source: include_str!("../../templates/commands/commands_base.py"),
    },
];

const BASE_MODULE: &str = "commands_base.py";

// ── Schema ──────────────────────────────────────────────────────────────

/// `struct` format code of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentType {
    #[serde(rename = "B")]
    Uint8,
    #[serde(rename = "H")]
    Uint16,
    #[serde(rename = "I")]
    Uint32,
    #[serde(rename = "Q")]
    Uint64,
    #[serde(rename = "b")]
    Int8,
    #[serde(rename = "h")]
    Int16,
    #[serde(rename = "i")]
    Int32,
    #[serde(rename = "q")]
    Int64,
    #[serde(rename = "e")]
    Float16,
    #[serde(rename = "f")]
    Float32,
    #[serde(rename = "d")]
    Float64,
    #[serde(rename = "?")]
    Bool,
    #[serde(rename = "s")]
    Bytes,
}

impl ArgumentType {
    pub fn python(self) -> &'static str {
        match self {
            Self::Uint8
            | Self::Uint16
            | Self::Uint32
            | Self::Uint64
            | Self::Int8
            | Self::Int16
            | Self::Int32
            | Self::Int64 => "int",
            Self::Float16 | Self::Float32 | Self::Float64 => "float",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
        }
    }

    pub fn c(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8_t",
            Self::Uint16 => "uint16_t",
            Self::Uint32 => "uint32_t",
            Self::Uint64 => "uint64_t",
            Self::Int8 => "int8_t",
            Self::Int16 => "int16_t",
            Self::Int32 => "int32_t",
            Self::Int64 => "int64_t",
            // no portable half-precision type in C99
            Self::Float16 => "uint16_t",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Bool => "bool",
            Self::Bytes => "uint8_t",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endianness {
    #[serde(rename = ">")]
    Big,
    #[default]
    #[serde(rename = "<")]
    Little,
}

/// Argument default. A bare string names one of the argument's enums and is
/// resolved to it during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentDefault {
    Bool(bool),
    Int(i64),
    List(Vec<i64>),
    Enum(EnumValue),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ArgumentType,
    #[serde(default)]
    pub enums: Option<Vec<EnumValue>>,
    #[serde(default)]
    pub default: Option<ArgumentDefault>,
    #[serde(default, skip_deserializing)]
    pub type_python: String,
    #[serde(default, skip_deserializing)]
    pub type_c: String,
}

impl Argument {
    fn resolve(&mut self, path: &str) -> Result<(), ValidationError> {
        self.type_python = self.kind.python().to_string();
        self.type_c = self.kind.c().to_string();

        let Some(ArgumentDefault::Name(name)) = self.default.clone() else {
            return Ok(());
        };
        let found = self.enums.iter().flatten().find(|e| e.name == name).cloned();
        match found {
            Some(e) => {
                self.default = Some(ArgumentDefault::Enum(e));
                Ok(())
            }
            None => Err(ValidationError::at(
                format!("{path}.default"),
                format!("'{name}' is not one of the argument's enums"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<Argument>,
    #[serde(default)]
    pub returns: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandsConfig {
    pub name: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub endianness: Endianness,
    pub commands: Vec<Command>,
}

impl CommandsConfig {
    /// Resolve enum defaults, derive type names and sort commands by id.
    fn resolve(&mut self) -> Result<(), ValidationError> {
        for (ci, cmd) in self.commands.iter_mut().enumerate() {
            for (ai, arg) in cmd.args.iter_mut().enumerate() {
                arg.resolve(&format!("commands[{ci}].args[{ai}]"))?;
            }
            for (ri, ret) in cmd.returns.iter_mut().enumerate() {
                ret.resolve(&format!("commands[{ci}].returns[{ri}]"))?;
            }
        }
        self.commands.sort_by_key(|c| c.id);
        Ok(())
    }
}

// ── Domain ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandsDomain;

impl Domain for CommandsDomain {
    fn name(&self) -> &str {
        "commands"
    }

    fn description(&self) -> &str {
        "Generate code from command definitions"
    }

    fn detect(&self, document: &Document) -> Result<bool, DomainError> {
        Ok(document.get("commands").is_some())
    }

    fn validate(&self, document: &Document) -> Result<ValidatedConfig, ValidationError> {
        let mut config: CommandsConfig = parse(document)?;
        config.resolve()?;

        let base = BaseConfig {
            name: config.name.clone(),
            file: config.file.clone(),
        };
        Ok(ValidatedConfig::new(base, into_data(&config)?)?)
    }

    fn templates_location(&self) -> TemplateLocation {
        TemplateLocation::Embedded(TEMPLATES)
    }

    fn post_generate(
        &self,
        config: &ValidatedConfig,
        output: &Path,
        generated: &BTreeSet<String>,
        fs: &dyn Filesystem,
    ) -> EmbgenResult<Vec<String>> {
        if !generated.contains("py") {
            return Ok(Vec::new());
        }
        let target = format!("{}_base.py", config.output_filename());
        Ok(vec![copy_companion(self, BASE_MODULE, &target, output, fs)?])
    }
}
