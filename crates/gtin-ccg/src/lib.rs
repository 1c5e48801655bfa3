//! # gtin-ccg: CCG/SEFAZ Remote Lookup
//!
//! Client for the `ccgConsGTIN` web service (Cadastro Centralizado de GTIN),
//! the tax authority registry that returns description, NCM and CEST for
//! Brazilian GTINs.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         gtin-ccg Architecture                           │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐                │
//! │  │   config     │   │   envelope   │   │  http_codes  │                │
//! │  │  CcgConfig   │   │ SOAP 1.2 req │   │ status table │                │
//! │  └──────┬───────┘   └──────┬───────┘   └──────┬───────┘                │
//! │         │                  │                  │                         │
//! │  ┌──────▼──────────────────▼──────────────────▼───────┐                │
//! │  │                     client                          │                │
//! │  │   CcgClient ── impl gtin_core::RemoteLookup         │                │
//! │  │   load_pfx()                                        │                │
//! │  └──────┬──────────────────────────────┬───────────────┘                │
//! │         │                              │                                │
//! │  ┌──────▼───────┐               ┌──────▼───────┐                        │
//! │  │   response   │               │    debug     │                        │
//! │  │ retConsGTIN  │               │ capture files│                        │
//! │  └──────────────┘               └──────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use gtin_ccg::{load_pfx, CcgClient, CcgConfig};
//! use gtin_core::Gtin;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CcgClient::new(CcgConfig::load(None)?)?;
//! let credential = load_pfx("certificate.pfx", "password").await?;
//!
//! let gtin = Gtin::check_with_credential("7894900011517", credential)?;
//! let product = gtin.lookup(&client).await?;
//! println!("{:?}", product.product_description);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod debug;
pub mod envelope;
pub mod error;
pub mod http_codes;
pub mod response;

pub use client::{load_pfx, CcgClient};
pub use config::{CcgConfig, DebugSettings, ServiceSettings, DEFAULT_ENDPOINT};
pub use debug::DebugRecorder;
pub use error::{CcgError, CcgResult};
