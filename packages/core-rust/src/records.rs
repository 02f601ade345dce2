//! Typed record schemas for the shipped catalog collections.
//!
//! The machinery never depends on these shapes -- any [`Document`] works --
//! but the `cpu` and `gpu` collections carry these fields, and typed callers
//! deserialize into them. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// A CPU spec record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuRecord {
    pub id: String,
    pub model: String,
    /// Brand name: "Intel", "AMD", ...
    pub brand: String,
    /// Release date, `YYYY-MM-DD`.
    pub release_date: String,
    /// Reference price.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Core layout, e.g. `"8P+16E"`.
    pub cores: String,
    /// Base clock in GHz.
    pub base_clock: f64,
    /// Maximum boost clock in GHz.
    pub boost_clock: f64,
    /// Socket, e.g. `"LGA1700"`, `"AM5"`.
    pub socket: String,
    /// Thermal design power in watts.
    pub tdp: u32,
    pub integrated_graphics: bool,
    /// Cache size in MB.
    pub cache: u32,
}

/// A GPU spec record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuRecord {
    pub id: String,
    pub model: String,
    pub brand: String,
    /// Release date, `YYYY-MM-DD`.
    pub release_date: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Video memory in GB.
    pub vram: u32,
    /// Memory bus width in bits.
    pub bus_width: u32,
    /// CUDA core count (NVIDIA) or stream processor count (AMD).
    pub cuda_cores: u32,
    /// Core clock in MHz.
    pub core_clock: u32,
    /// Memory clock in MHz.
    pub memory_clock: u32,
    /// Board power in watts.
    pub power_consumption: u32,
    pub ray_tracing: bool,
    /// Upscaling technology: `"DLSS"`, `"FSR"`, `"XeSS"`, or `"无"`.
    pub upscaling_tech: String,
}

impl Document for CpuRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for GpuRecord {
    fn id(&self) -> &str {
        &self.id
    }
}
