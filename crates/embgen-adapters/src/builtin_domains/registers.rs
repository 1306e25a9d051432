//! `registers` domain: memory-mapped register maps.

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
        source: include_str!("../../templates/registers/template.h.j2"),
    },
    EmbeddedTemplate {
        name: "template.md.j2",
        source: include_str!("../../templates/registers/template.md.j2"),
    },
    EmbeddedTemplate {
        name: "template.c_multi.h.j2",
        source: include_str!("../../templates/registers/template.c_multi.h.j2"),
    },
    EmbeddedTemplate {
        name: "template.c_multi.c.j2",
        source: include_str!("../../templates/registers/template.c_multi.c.j2"),
    },
    EmbeddedTemplate {
        name: "reg_common.h",
        source: include_str!("../../templates/registers/reg_common.h"),
    },
    EmbeddedTemplate {
        name: "reg_common.c",
        source: include_str!("../../templates/registers/reg_common.c"),
    },
];

const COMPANIONS: [&str; 2] = ["reg_common.h", "reg_common.c"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Ro,
    #[default]
    Rw,
    Wo,
    Rw1c,
    Wosc,
    Rolh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub reset: i64,
    pub width: u32,
    pub offset: u32,
    #[serde(default)]
    pub enums: Option<Vec<EnumValue>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub address: i64,
    #[serde(default)]
    pub access: Access,
    pub bitfields: Vec<BitField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistersConfig {
    pub name: String,
    #[serde(default)]
    pub file: Option<String>,
    pub regmap: Vec<Register>,
}

impl RegistersConfig {
    /// Registers by address, bitfields by offset.
    fn sort(&mut self) {
        self.regmap.sort_by_key(|r| r.address);
        for reg in &mut self.regmap {
            reg.bitfields.sort_by_key(|b| b.offset);
        }
    }

    fn bitfields(&self) -> Vec<&BitField> {
        self.regmap.iter().flat_map(|r| r.bitfields.iter()).collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RegistersDomain;

impl Domain for RegistersDomain {
    fn name(&self) -> &str {
        "registers"
    }

    fn description(&self) -> &str {
        "Generate code from register map definitions"
    }

    fn detect(&self, document: &Document) -> Result<bool, DomainError> {
        Ok(document.get("regmap").is_some())
    }

    fn validate(&self, document: &Document) -> Result<ValidatedConfig, ValidationError> {
        let mut config: RegistersConfig = parse(document)?;
        config.sort();

        let mut data = into_data(&config)?;
        let flat = serde_json::to_value(config.bitfields())
            .map_err(|e| ValidationError::new(e.to_string()))?;
        data.insert("bitfields".into(), flat);

        let base = BaseConfig {
            name: config.name,
            file: config.file,
        };
        Ok(ValidatedConfig::new(base, data)?)
    }

    fn templates_location(&self) -> TemplateLocation {
        TemplateLocation::Embedded(TEMPLATES)
    }

    fn post_generate(
        &self,
        _config: &ValidatedConfig,
        output: &Path,
        generated: &BTreeSet<String>,
        fs: &dyn Filesystem,
    ) -> EmbgenResult<Vec<String>> {
        if !generated.contains("h") {
            return Ok(Vec::new());
        }
        COMPANIONS
            .iter()
            .map(|name| copy_companion(self, name, name, output, fs))
            .collect()
    }
}
