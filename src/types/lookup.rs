//! Field lookups shared by every [`Type`] implementation

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::utils::{Error, Result};

use super::{Identity, Kind, StructField, Type};

fn fields_of<T: Type + ?Sized>(ty: &T) -> Result<Vec<StructField>> {
    (0..ty.num_field()?).map(|i| ty.field(i)).collect()
}

pub(super) fn field_by_index<T: Type + ?Sized>(ty: &T, index: &[usize]) -> Result<StructField> {
    let (&first, rest) = index
        .split_first()
        .ok_or(Error::IndexOutOfRange { index: 0, count: 0 })?;
    let mut field = ty.field(first)?;
    for &i in rest {
        let mut parent = Arc::clone(&field.ty);
        if parent.kind() == Kind::Ptr {
            let elem = parent.elem()?;
            if elem.kind() == Kind::Struct {
                parent = elem;
            }
        }
        field = parent.field(i)?;
    }
    field.index = index.to_vec();
    Ok(field)
}

/// One struct to scan at the current depth
struct Scan {
    fields: Vec<StructField>,
    path: Vec<usize>,
    /// Reached through more than one embedding at this depth
    multiple: bool,
}

/// Breadth-first search over a struct and the structs it embeds. The first
/// depth with a match decides; more than one match there is ambiguous.
pub(super) fn field_by_name_func<T: Type + ?Sized>(
    ty: &T,
    matches: &dyn Fn(&str) -> bool,
) -> Result<Option<StructField>> {
    let kind = ty.kind();
    if kind != Kind::Struct {
        return Err(Error::NotApplicable { method: "field_by_name", kind });
    }

    let mut visited: HashSet<Identity> = HashSet::from([ty.identity()]);
    let mut level = vec![Scan { fields: fields_of(ty)?, path: Vec::new(), multiple: false }];

    while !level.is_empty() {
        let mut found: Option<StructField> = None;
        let mut count = 0;
        let mut next: Vec<Scan> = Vec::new();
        let mut next_ids: HashMap<Identity, usize> = HashMap::new();

        for scan in &level {
            for (i, field) in scan.fields.iter().enumerate() {
                let mut path = scan.path.clone();
                path.push(i);

                if matches(&field.name) {
                    count += if scan.multiple { 2 } else { 1 };
                    if found.is_none() {
                        found = Some(StructField { index: path, ..field.clone() });
                    }
                    continue;
                }

                if !field.anonymous {
                    continue;
                }
                let mut embedded = Arc::clone(&field.ty);
                if embedded.kind() == Kind::Ptr {
                    embedded = embedded.elem()?;
                }
                if embedded.kind() != Kind::Struct {
                    continue;
                }
                let id = embedded.identity();
                if visited.contains(&id) {
                    continue;
                }
                match next_ids.get(&id) {
                    Some(&k) => next[k].multiple = true,
                    None => {
                        next_ids.insert(id, next.len());
                        next.push(Scan {
                            fields: fields_of(embedded.as_ref())?,
                            path,
                            multiple: scan.multiple,
                        });
                    }
                }
            }
        }

        match count {
            0 => {}
            1 => return Ok(found),
            _ => return Ok(None),
        }
        visited.extend(next_ids.into_keys());
        level = next;
    }

    Ok(None)
}
