//! Scenario validation logic.

use std::collections::HashSet;

use ul_steamnet::SteamNetError;

use crate::schema::{ControllerDef, LcaDef, Scenario, SweepDef};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate entry: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version == 0 || scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }

    match scenario.params.validate() {
        Ok(()) => {}
        Err(SteamNetError::Params { field, reason }) => {
            return Err(invalid(&format!("params.{field}"), "", &reason));
        }
        Err(other) => return Err(invalid("params", "", &other.to_string())),
    }

    validate_controller(&scenario.controller)?;
    validate_lca(&scenario.lca)?;
    validate_sweeps(&scenario.sweeps)?;

    if let Some(export) = &scenario.export
        && export.database.trim().is_empty()
    {
        return Err(invalid("export.database", "", "must not be empty"));
    }
    Ok(())
}

fn validate_controller(controller: &ControllerDef) -> Result<(), ValidationError> {
    let duty = controller.placeholder_duty_w;
    if !duty.is_finite() || duty <= 0.0 {
        return Err(invalid(
            "controller.placeholder_duty_w",
            duty,
            "must be positive",
        ));
    }
    let offset = controller.makeup_offset_k;
    if !offset.is_finite() || offset < 0.0 {
        return Err(invalid(
            "controller.makeup_offset_k",
            offset,
            "must be non-negative",
        ));
    }
    Ok(())
}

fn validate_lca(lca: &LcaDef) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for category in &lca.categories {
        if !seen.insert(category) {
            return Err(ValidationError::DuplicateId {
                id: category.to_string(),
                context: "lca.categories".to_string(),
            });
        }
    }

    let c = lca.dataset_correction;
    if !c.is_finite() || c <= 0.0 {
        return Err(invalid("lca.dataset_correction", c, "must be positive"));
    }

    // Impact needs both background links; the engine would refuse later.
    if !lca.categories.is_empty() {
        if lca.heat_dataset.is_none() {
            return Err(ValidationError::MissingReference {
                id: "heat_dataset".to_string(),
                context: "lca".to_string(),
            });
        }
        if lca.electricity_dataset.is_none() {
            return Err(ValidationError::MissingReference {
                id: "electricity_dataset".to_string(),
                context: "lca".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_sweeps(sweeps: &[SweepDef]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for sweep in sweeps {
        let name = sweep.parameter.name();
        if !seen.insert(sweep.parameter) {
            return Err(ValidationError::DuplicateId {
                id: name.to_string(),
                context: "sweeps".to_string(),
            });
        }
        if sweep.values.is_empty() {
            return Err(invalid(
                &format!("sweeps.{name}.values"),
                "[]",
                "must not be empty",
            ));
        }
        if let Some(bad) = sweep.values.iter().find(|v| !v.is_finite()) {
            return Err(invalid(
                &format!("sweeps.{name}.values"),
                bad,
                "must be finite",
            ));
        }
    }
    Ok(())
}
