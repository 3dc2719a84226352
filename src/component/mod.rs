// src/component/mod.rs

//! Config binding for the `bender_serial_sensor` component: schema
//! validation and the directives the host generator turns into C++.

pub mod codegen;
pub mod schema;
pub mod validate;
pub mod value;

pub use codegen::{CodegenContext, CodegenError, Directive, Expression};
pub use schema::{BenderSensorConfig, IdRegistry, SchemaKey, CONFIG_SCHEMA};
pub use validate::{ValidationError, ValidationErrorKind, ValidationErrors};
pub use value::{ConfigMap, ConfigValue};

use alloc::vec;

/// Errors of a full validate-then-generate run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("invalid configuration:\n{0}")]
    Validation(#[from] ValidationErrors),
    #[error("code generation failed: {0}")]
    Codegen(#[from] CodegenError),
}

/// A component the host can validate and generate code for.
pub trait ComponentBinding {
    type Config;

    /// Top-level config key.
    const DOMAIN: &'static str;
    /// Host components that must be configured alongside.
    const DEPENDENCIES: &'static [&'static str];

    fn schema() -> &'static [SchemaKey];

    fn validate(raw: &ConfigValue, registry: &mut IdRegistry) -> Result<Self::Config, ValidationErrors>;

    fn to_code(config: &Self::Config, ctx: &mut CodegenContext) -> Result<(), CodegenError>;
}

/// The `bender_serial_sensor` component.
pub struct BenderSerialSensor;

impl BenderSerialSensor {
    pub const NAMESPACE: &'static str = "bender_serial_sensor";
    pub const CLASS: &'static str = "bender_serial_sensor::BenderSerialSensor";
}

impl ComponentBinding for BenderSerialSensor {
    type Config = BenderSensorConfig;

    const DOMAIN: &'static str = Self::NAMESPACE;
    const DEPENDENCIES: &'static [&'static str] = &["uart"];

    fn schema() -> &'static [SchemaKey] {
        CONFIG_SCHEMA
    }

    fn validate(raw: &ConfigValue, registry: &mut IdRegistry) -> Result<BenderSensorConfig, ValidationErrors> {
        schema::validate_config(Self::DOMAIN, Self::CLASS, raw, registry)
    }

    fn to_code(config: &BenderSensorConfig, ctx: &mut CodegenContext) -> Result<(), CodegenError> {
        let id = config.id.as_str();
        log::debug!("Generating {} '{}'", Self::CLASS, id);

        // Fail before emitting anything.
        ctx.get_variable(&config.uart_id)?;
        ctx.new_instance(id, Self::CLASS)?;
        codegen::register_component(ctx, id, config.setup_priority)?;
        codegen::register_uart_device(ctx, id, &config.uart_id)?;
        ctx.call(id, "set_sensitivity", vec![Expression::UInt(config.sensitivity.get())])?;
        if let Some(interval) = config.update_interval {
            ctx.call(id, "set_update_interval", vec![Expression::UInt(interval.as_millis())])?;
        }
        Ok(())
    }
}

/// Validates one raw config block and appends its directives to `ctx`.
///
/// Runs against staged copies of `registry` and `ctx`; neither changes unless
/// both validation and generation succeed.
pub fn generate<B: ComponentBinding>(
    raw: &ConfigValue,
    registry: &mut IdRegistry,
    ctx: &mut CodegenContext,
) -> Result<B::Config, BuildError> {
    let mut staged_registry = registry.clone();
    let mut staged_ctx = ctx.clone();

    let config = B::validate(raw, &mut staged_registry).map_err(|errors| {
        log::warn!("{} config rejected with {} error(s)", B::DOMAIN, errors.len());
        errors
    })?;
    B::to_code(&config, &mut staged_ctx).map_err(|e| {
        log::warn!("{} code generation failed: {}", B::DOMAIN, e);
        e
    })?;

    *registry = staged_registry;
    *ctx = staged_ctx;
    Ok(config)
}
