// src/component/schema.rs

use super::validate::{self, ValidationError, ValidationErrorKind, ValidationErrors};
use super::value::{ConfigMap, ConfigValue};
use crate::common::hal_traits::BenderSerial;
use crate::common::types::{Sensitivity, UpdateInterval};
use crate::monitor::{BenderMonitor, SensorSink};

use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

pub const CONF_ID: &str = "id";
pub const CONF_UPDATE_INTERVAL: &str = "update_interval";
pub const CONF_SENSITIVITY: &str = "sensitivity";
pub const CONF_SETUP_PRIORITY: &str = "setup_priority";
pub const CONF_UART_ID: &str = "uart_id";

/// Sensitivity used when the key is omitted.
pub const DEFAULT_SENSITIVITY: u32 = 10;

/// Whether a key must, may, or is filled in when absent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Optional; the default is used when absent.
    OptionalDefault(i64),
    /// Optional; the host fills it in (generated or resolved ID).
    Generated,
}

/// Validator applied to a key's value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Validator {
    /// New instance ID, unique across the build.
    DeclareId,
    /// Reference to an ID of an existing UART bus.
    UseUartId,
    UpdateInterval,
    /// Positive integer sensitivity.
    Sensitivity,
    Float,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SchemaKey {
    pub key: &'static str,
    pub presence: Presence,
    pub validator: Validator,
}

/// Keys accepted by the `bender_serial_sensor` block: its own keys, then the
/// inherited component and UART device keys.
pub const CONFIG_SCHEMA: &[SchemaKey] = &[
    SchemaKey { key: CONF_ID, presence: Presence::Generated, validator: Validator::DeclareId },
    SchemaKey { key: CONF_UPDATE_INTERVAL, presence: Presence::Optional, validator: Validator::UpdateInterval },
    SchemaKey {
        key: CONF_SENSITIVITY,
        presence: Presence::OptionalDefault(DEFAULT_SENSITIVITY as i64),
        validator: Validator::Sensitivity,
    },
    // component schema
    SchemaKey { key: CONF_SETUP_PRIORITY, presence: Presence::Optional, validator: Validator::Float },
    // uart device schema
    SchemaKey { key: CONF_UART_ID, presence: Presence::Generated, validator: Validator::UseUartId },
];

/// Value-level output of a [`Validator`], one variant per validator.
#[derive(Debug, Clone, PartialEq)]
enum Validated {
    Id(String),
    UartId(String),
    Interval(UpdateInterval),
    Sensitivity(Sensitivity),
    Float(f32),
}

impl Validator {
    fn apply(&self, value: &ConfigValue, registry: &IdRegistry) -> Result<Validated, ValidationErrorKind> {
        match self {
            Validator::DeclareId => {
                let id = validate::valid_identifier(value)?;
                if registry.is_registered(&id) {
                    return Err(ValidationErrorKind::DuplicateId(id));
                }
                Ok(Validated::Id(id))
            }
            Validator::UseUartId => {
                let id = validate::valid_identifier(value)?;
                registry.resolve_uart_bus(Some(&id)).map(Validated::UartId)
            }
            Validator::UpdateInterval => validate::update_interval(value).map(Validated::Interval),
            Validator::Sensitivity => validate::sensitivity(value).map(Validated::Sensitivity),
            Validator::Float => validate::float_(value).map(Validated::Float),
        }
    }
}

// --- Host ID registry ---

/// IDs already taken in the build, and the declared UART buses.
#[derive(Debug, Clone, Default)]
pub struct IdRegistry {
    ids: BTreeSet<String>,
    uart_buses: Vec<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn register(&mut self, id: &str) -> Result<(), ValidationErrorKind> {
        if !self.ids.insert(id.to_string()) {
            return Err(ValidationErrorKind::DuplicateId(id.to_string()));
        }
        Ok(())
    }

    /// Declares a UART bus; its ID becomes taken as well.
    pub fn declare_uart_bus(&mut self, id: &str) -> Result<(), ValidationErrorKind> {
        self.register(id)?;
        self.uart_buses.push(id.to_string());
        Ok(())
    }

    pub fn uart_buses(&self) -> &[String] {
        &self.uart_buses
    }

    /// Resolves an explicit bus ID, or picks the only declared bus.
    pub fn resolve_uart_bus(&self, requested: Option<&str>) -> Result<String, ValidationErrorKind> {
        match requested {
            Some(id) if self.uart_buses.iter().any(|bus| bus == id) => Ok(id.to_string()),
            Some(id) => Err(ValidationErrorKind::UnknownUartBus(id.to_string())),
            None => match self.uart_buses.as_slice() {
                [] => Err(ValidationErrorKind::NoUartBus),
                [only] => Ok(only.clone()),
                _ => Err(ValidationErrorKind::AmbiguousUartBus),
            },
        }
    }

    /// First free ID derived from a qualified class name:
    /// `ns::Class` becomes `ns_class`, then `ns_class_2`, `ns_class_3`, ...
    pub fn unique_id(&self, qualified_class: &str) -> String {
        let base: String = qualified_class
            .replace("::", "_")
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        let mut candidate = base.clone();
        let mut tries = 1;
        while self.is_registered(&candidate) {
            tries += 1;
            candidate = format!("{}_{}", base, tries);
        }
        candidate
    }
}

// --- Validated record ---

/// Validated configuration of one `bender_serial_sensor` block.
#[derive(Debug, Clone, PartialEq)]
pub struct BenderSensorConfig {
    pub id: String,
    /// Whether `id` was generated rather than given by the user.
    pub id_generated: bool,
    pub update_interval: Option<UpdateInterval>,
    pub sensitivity: Sensitivity,
    pub setup_priority: Option<f32>,
    pub uart_id: String,
}

impl BenderSensorConfig {
    /// Applies the setter calls the generated code would make.
    pub fn apply_to<IF, S>(&self, monitor: &mut BenderMonitor<IF, S>)
    where
        IF: BenderSerial,
        S: SensorSink,
    {
        monitor.set_sensitivity(self.sensitivity);
        if let Some(interval) = self.update_interval {
            monitor.set_update_interval(interval);
        }
    }
}

/// Validates one raw config block against [`CONFIG_SCHEMA`].
///
/// All key errors are collected. On success the instance ID is registered in
/// `registry`; on failure the registry is left untouched.
pub fn validate_config(
    domain: &str,
    qualified_class: &str,
    raw: &ConfigValue,
    registry: &mut IdRegistry,
) -> Result<BenderSensorConfig, ValidationErrors> {
    let empty = ConfigMap::new();
    let map = match raw {
        ConfigValue::Map(map) => map,
        // A bare `bender_serial_sensor:` line has no value.
        ConfigValue::Null => &empty,
        other => {
            return Err(ValidationErrors(alloc::vec![ValidationError::new(
                domain,
                ValidationErrorKind::ExpectedMapping(other.type_name()),
            )]))
        }
    };

    let path = |key: &str| format!("{}->{}", domain, key);
    let mut errors = ValidationErrors::default();

    for key in map.keys() {
        if !CONFIG_SCHEMA.iter().any(|entry| entry.key == key.as_str()) {
            errors.push(ValidationError::new(path(key), ValidationErrorKind::UnknownOption(key.clone())));
        }
    }

    let mut values: Vec<Validated> = Vec::new();
    for entry in CONFIG_SCHEMA {
        let default;
        let value = match (map.get(entry.key), entry.presence) {
            (Some(value), _) => value,
            (None, Presence::OptionalDefault(d)) => {
                default = ConfigValue::Int(d);
                &default
            }
            (None, Presence::Required) => {
                errors.push(ValidationError::new(path(entry.key), ValidationErrorKind::MissingRequired));
                continue;
            }
            (None, Presence::Optional) | (None, Presence::Generated) => continue,
        };
        match entry.validator.apply(value, registry) {
            Ok(validated) => values.push(validated),
            Err(kind) => errors.push(ValidationError::new(path(entry.key), kind)),
        }
    }

    // Host-filled keys.
    let uart_id = match values.iter().any(|v| matches!(v, Validated::UartId(_))) {
        true => None,
        false if errors.has_error_for(CONF_UART_ID) => None,
        false => match registry.resolve_uart_bus(None) {
            Ok(id) => Some(id),
            Err(kind) => {
                errors.push(ValidationError::new(path(CONF_UART_ID), kind));
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let mut config = BenderSensorConfig {
        id: String::new(),
        id_generated: true,
        update_interval: None,
        sensitivity: Sensitivity::DEFAULT,
        setup_priority: None,
        uart_id: uart_id.unwrap_or_default(),
    };
    for validated in values {
        match validated {
            Validated::Id(id) => {
                config.id = id;
                config.id_generated = false;
            }
            Validated::UartId(id) => config.uart_id = id,
            Validated::Interval(interval) => config.update_interval = Some(interval),
            Validated::Sensitivity(sensitivity) => config.sensitivity = sensitivity,
            // `setup_priority` is the only float key.
            Validated::Float(priority) => config.setup_priority = Some(priority),
        }
    }
    if config.id_generated {
        config.id = registry.unique_id(qualified_class);
    }

    registry
        .register(&config.id)
        .map_err(|kind| ValidationErrors(alloc::vec![ValidationError::new(path(CONF_ID), kind)]))?;
    Ok(config)
}
