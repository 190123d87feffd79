//! Loading a declaration unit into a [`TypeMap`]

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::frontend::ast::SourceFile;
use crate::frontend::Parser;
use crate::resolve::Builder;
use crate::types::{PrimitiveRegistry, TypeMap};
use crate::utils::{Error, Result};

/// Build every type declared in an already-parsed unit
pub fn build_file(file: &SourceFile, registry: Arc<PrimitiveRegistry>) -> Result<TypeMap> {
    let mut builder = Builder::new(file.package.name.clone(), registry);
    builder.register(file)?;
    let graph = builder.build()?;
    Ok(TypeMap::new(Arc::new(graph)))
}

/// Parse and build the types declared in `source`
pub fn load_str(source: &str) -> Result<TypeMap> {
    let file = Parser::new(source)?.parse_file()?;
    debug!("parsed package {} with {} declarations", file.package.name, file.decls.len());
    build_file(&file, PrimitiveRegistry::shared())
}

/// Read a whole unit from `reader`, then parse and build it
pub fn load_types<R: Read>(mut reader: R) -> Result<TypeMap> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let source = String::from_utf8(bytes).map_err(|e| Error::InvalidUtf8 {
        offset: e.utf8_error().valid_up_to(),
    })?;
    load_str(&source)
}

/// Load the unit stored at `path`
pub fn load_file(path: impl AsRef<Path>) -> Result<TypeMap> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::Io(format!("{}: {}", path.display(), e)))?;
    debug!("loading {}", path.display());
    load_types(file)
}
