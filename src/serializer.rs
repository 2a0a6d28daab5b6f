//! The codec facade and its builder.

use crate::convert::{ConversionService, DefaultConversionService};
use crate::envelope::{RootSeed, RootSer};
use crate::error::{Error, ErrorSlot, Result};
use crate::pool::{BufferPool, PooledReader, PooledWriter};
use crate::registry::TypeRegistry;
use crate::value::{ContextValue, ExecutionContext};
use serde::de::DeserializeSeed;
use std::io::{Read, Write};
use std::sync::Arc;

/// Writes execution contexts to byte sinks and reads them back, preserving
/// each entry's type through the `{"@class", "value"}` envelope.
///
/// Immutable after construction and safe to share across threads; per
/// operation scratch buffers come from an internal [`BufferPool`].
///
/// ```rust
/// use context_codec::{ContextSerializer, ContextValue, ExecutionContext};
///
/// let codec = ContextSerializer::new();
/// let mut context = ExecutionContext::new();
/// context.insert("total", ContextValue::Long(42));
///
/// let mut bytes = Vec::new();
/// codec.write(&context, &mut bytes).unwrap();
/// let restored = codec.read(bytes.as_slice()).unwrap();
/// assert_eq!(restored, context);
/// ```
pub struct ContextSerializer {
    registry: TypeRegistry,
    convert: Arc<dyn ConversionService>,
    pool: BufferPool,
    pretty: bool,
}

impl ContextSerializer {
    /// A codec with the built-in registry tables and the default conversion
    /// service.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// A codec with a caller-supplied conversion service and the built-in
    /// registry tables.
    #[must_use]
    pub fn with_conversion_service(convert: Arc<dyn ConversionService>) -> Self {
        Self::builder().conversion_service(convert).build()
    }

    /// A codec from pre-built parts.
    #[must_use]
    pub fn from_parts(registry: TypeRegistry, convert: Arc<dyn ConversionService>) -> Self {
        Self::builder()
            .registry(registry)
            .conversion_service(convert)
            .build()
    }

    /// Start configuring a codec. Call
    /// [`.build()`](ContextSerializerBuilder::build) when ready.
    #[must_use]
    pub fn builder() -> ContextSerializerBuilder {
        ContextSerializerBuilder::new()
    }

    /// The tag registry this codec resolves `@class` values against.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Stream `context` to `sink` as an envelope document.
    ///
    /// Keys are emitted in the context's insertion order, each value wrapped
    /// in `{"@class": tag, "value": payload}`. The sink is flushed before
    /// returning.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a top-level [`ContextValue::Null`];
    /// [`Error::Conversion`] when a parameter value cannot be rendered;
    /// [`Error::Io`] on sink failure.
    pub fn write<W: Write>(&self, context: &ExecutionContext, sink: W) -> Result<()> {
        for (key, value) in context.iter() {
            if matches!(value, ContextValue::Null) {
                return Err(Error::InvalidArgument(format!(
                    "null value for key {key:?} has no envelope form"
                )));
            }
        }
        let slot = ErrorSlot::new();
        let root = RootSer {
            context,
            convert: self.convert.as_ref(),
            slot: &slot,
        };
        let mut writer = PooledWriter::new(&self.pool, sink);
        let outcome = if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &root)
        } else {
            serde_json::to_writer(&mut writer, &root)
        };
        outcome.map_err(|e| slot.resolve(e))?;
        writer.finish().map_err(Error::from)
    }

    /// Decode a single envelope document from `source`.
    ///
    /// Entries are returned in document order. Decoding is streaming and
    /// stops at the first violation.
    ///
    /// # Errors
    ///
    /// [`Error::Schema`] for wire-shape violations,
    /// [`Error::ClassNotFound`] for unresolvable tags,
    /// [`Error::Conversion`] for rejected parameter coercions,
    /// [`Error::Io`] on source failure.
    pub fn read<R: Read>(&self, source: R) -> Result<ExecutionContext> {
        let slot = ErrorSlot::new();
        let reader = PooledReader::new(&self.pool, source);
        let mut de = serde_json::Deserializer::from_reader(reader);
        let seed = RootSeed {
            registry: &self.registry,
            convert: self.convert.as_ref(),
            slot: &slot,
        };
        let context = seed.deserialize(&mut de).map_err(|e| slot.resolve(e))?;
        de.end().map_err(|e| slot.resolve(e))?;
        Ok(context)
    }
}

impl Default for ContextSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextSerializer")
            .field("registry", &self.registry)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}

/// Configures and builds a [`ContextSerializer`].
///
/// ```rust
/// use context_codec::ContextSerializer;
///
/// let codec = ContextSerializer::builder()
///     .register("com.example.Checkpoint")
///     .pretty(true)
///     .build();
/// assert!(codec.registry().is_registered("com.example.Checkpoint"));
/// ```
pub struct ContextSerializerBuilder {
    registry: TypeRegistry,
    convert: Option<Arc<dyn ConversionService>>,
    pretty: bool,
}

impl ContextSerializerBuilder {
    fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            convert: None,
            pretty: false,
        }
    }

    /// Replace the registry wholesale (default: built-in tables only).
    #[must_use]
    pub fn registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register one custom aggregate tag on the builder's registry.
    #[must_use]
    pub fn register(mut self, tag: impl Into<String>) -> Self {
        self.registry.register(tag);
        self
    }

    /// Use a caller-supplied conversion service (default:
    /// [`DefaultConversionService`]).
    #[must_use]
    pub fn conversion_service(mut self, convert: Arc<dyn ConversionService>) -> Self {
        self.convert = Some(convert);
        self
    }

    /// Write human-readable JSON with indentation (default: compact).
    #[must_use]
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Build the codec.
    #[must_use]
    pub fn build(self) -> ContextSerializer {
        ContextSerializer {
            registry: self.registry,
            convert: self
                .convert
                .unwrap_or_else(|| Arc::new(DefaultConversionService::new())),
            pool: BufferPool::new(),
            pretty: self.pretty,
        }
    }
}

impl std::fmt::Debug for ContextSerializerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextSerializerBuilder")
            .field("registry", &self.registry)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}
