//! Built-in scalar types, seeded into every builder's symbol table

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::sync::{Arc, OnceLock};

use num_complex::Complex;

use crate::live::LiveType;

/// Descriptors for the predeclared types, each taken from a real value
#[derive(Debug, Clone)]
pub struct PrimitiveRegistry {
    types: BTreeMap<&'static str, LiveType>,
}

impl PrimitiveRegistry {
    pub fn new() -> Self {
        let err: Box<dyn StdError + Send + Sync> = "".into();
        let types = BTreeMap::from([
            ("bool", LiveType::of(&false)),
            ("byte", LiveType::of(&0u8)),
            ("rune", LiveType::of(&0i32)),
            ("int", LiveType::of(&0isize)),
            ("int8", LiveType::of(&0i8)),
            ("int16", LiveType::of(&0i16)),
            ("int32", LiveType::of(&0i32)),
            ("int64", LiveType::of(&0i64)),
            ("uint", LiveType::of(&0usize)),
            ("uint8", LiveType::of(&0u8)),
            ("uint16", LiveType::of(&0u16)),
            ("uint32", LiveType::of(&0u32)),
            ("uint64", LiveType::of(&0u64)),
            ("float32", LiveType::of(&0f32)),
            ("float64", LiveType::of(&0f64)),
            ("complex64", LiveType::of(&Complex::<f32>::new(0.0, 0.0))),
            ("complex128", LiveType::of(&Complex::<f64>::new(0.0, 0.0))),
            ("string", LiveType::of(&String::new())),
            ("error", LiveType::of(&*err)),
        ]);
        Self { types }
    }

    /// Process-wide registry, built on first use
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<PrimitiveRegistry>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(PrimitiveRegistry::new())))
    }

    pub fn get(&self, name: &str) -> Option<&LiveType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Built-in names with their descriptors, in name order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &LiveType)> {
        self.types.iter().map(|(name, ty)| (*name, ty))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }
}

impl Default for PrimitiveRegistry {
    fn default() -> Self {
        Self::new()
    }
}
