//! # Media Variants
//!
//! Turns one uploaded image into a fixed catalog of resized variants,
//! publishes each to an object store, and returns the metadata map the CMS
//! stores on the owning media record.
//!
//! # Architecture: One Decode, Many Variants
//!
//! ```text
//! upload bytes ─ detect ─ decode ─┬─ resize ─ encode ─ put ─┐
//!                                 ├─ resize ─ encode ─ put ─┼─→ VariantMetadataMap
//!                                 └─ ...                    ┘
//! ```
//!
//! The original is decoded once; every catalog entry then runs independently
//! (in parallel via rayon) against the read-only decoded pixels. A failing
//! variant is logged and omitted, so a map may hold fewer entries than the
//! catalog. Only detection and decode failures fail the whole call.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Format sniffing, codec backends, Lanczos3 resizing, capability probe |
//! | [`catalog`] | The fixed list of named variant sizes |
//! | [`naming`] | `{basename}-{variant}.{ext}` filename derivation |
//! | [`generate`] | The orchestrator: decode once, render and publish every variant |
//! | [`publish`] | Upload one variant and build its metadata entry |
//! | [`store`] | `ObjectStore` trait with memory and filesystem stores |
//! | [`types`] | `GeneratedVariant`, `VariantMetadata`, `VariantMetadataMap` |
//! | [`records`] | Media records and the repository that owns them |
//! | [`cleanup`] | Deleting a record's variants |
//! | [`regenerate`] | Batch backfill of variants for existing records |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Source Format Is Preserved
//!
//! Variants are re-encoded in the format sniffed from the upload: a PNG
//! original yields PNG variants. The declared mimetype is advisory only; a
//! `.jpg` that is really a PNG produces `.png` variants.
//!
//! ## Two Codec Backends, One Contract
//!
//! [`imaging::CodecAdapter`] has a native implementation built on the `image`
//! crate's integrated decode/resize path and a portable one assembled from
//! standalone codecs and `fast_image_resize`. Both share the same dimension
//! planning ([`imaging::calculations::plan_resize`]), so declared output sizes
//! never depend on the backend. The choice is made once per process by
//! [`imaging::probe`].
//!
//! ## Metadata Only After Upload
//!
//! A [`types::VariantMetadata`] entry exists only for a variant whose `put`
//! succeeded. Consumers can trust every URL in a map and must tolerate
//! missing names.

pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod publish;
pub mod records;
pub mod regenerate;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
