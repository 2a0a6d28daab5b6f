//! Type-preserving JSON codec for batch execution contexts.
//!
//! An execution context is an ordered map from string keys to heterogeneous
//! values that has to survive a round-trip through a relational store as a
//! text blob. Plain JSON loses the types: numbers forget whether they were
//! longs or decimals, dates collapse into strings. This codec wraps every
//! top-level entry in a `{"@class": <tag>, "value": <payload>}` envelope so
//! the exact value kind comes back on decode, and resolves tags through a
//! fail-closed registry rather than loading anything by name.
//!
//! ```rust
//! use context_codec::{ContextSerializer, ContextValue, ExecutionContext};
//!
//! let codec = ContextSerializer::new();
//! let mut context = ExecutionContext::new();
//! context.insert("run.count", ContextValue::Long(12345));
//! context.insert("run.label", ContextValue::from("OBJECT TWO"));
//!
//! let mut blob = Vec::new();
//! codec.write(&context, &mut blob).unwrap();
//! assert_eq!(codec.read(blob.as_slice()).unwrap(), context);
//! ```
//!
//! Custom aggregates register a tag they own and travel as JSON payloads:
//!
//! ```rust
//! use context_codec::{ContextSerializer, ContextValue, CustomValue, ExecutionContext};
//!
//! let codec = ContextSerializer::builder()
//!     .register("com.example.Checkpoint")
//!     .build();
//! let payload = serde_json::json!({"offset": 10, "file": "part-0001"});
//! let mut context = ExecutionContext::new();
//! context.insert(
//!     "checkpoint",
//!     ContextValue::Custom(CustomValue::new("com.example.Checkpoint", payload)),
//! );
//!
//! let mut blob = Vec::new();
//! codec.write(&context, &mut blob).unwrap();
//! assert_eq!(codec.read(blob.as_slice()).unwrap(), context);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod convert;
mod envelope;
pub mod error;
pub mod parameter;
pub mod pool;
pub mod registry;
pub mod serializer;
pub mod value;

pub use convert::{ConversionService, DefaultConversionService, RawScalar};
pub use error::{Error, Result};
pub use parameter::{JobParameter, JobParameters, ParameterValue};
pub use pool::BufferPool;
pub use registry::{TypeKind, TypeRegistry};
pub use serializer::{ContextSerializer, ContextSerializerBuilder};
pub use value::{ContextValue, CustomValue, ExecutionContext, Locale};
