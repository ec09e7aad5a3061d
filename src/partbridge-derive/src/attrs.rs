use syn::spanned::Spanned;
use syn::{Attribute, Error as SynError, Field, LitStr, Meta, Result as SynResult};

#[derive(Debug)]
pub struct PartAttrs {
    pub not_composable: bool,
}

pub fn parse_part_attributes(attrs: &[Attribute]) -> SynResult<PartAttrs> {
    let mut not_composable = false;

    for attr in attrs {
        if !attr.path().is_ident("part") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("not_composable") {
                not_composable = true;
                Ok(())
            } else {
                Err(meta.error("expects `#[part(not_composable)]`"))
            }
        })?;
    }

    Ok(PartAttrs { not_composable })
}

#[derive(Debug)]
pub enum FieldImport {
    /// The field carries no import attribute and is left alone.
    Plain,
    /// The field is an `Option<T>` import point.
    Import {
        name: Option<LitStr>,
        recompose: bool,
    },
    /// The field is an embedded part contributing its own import points.
    Flatten,
}

pub fn parse_field_attributes(field: &Field) -> SynResult<FieldImport> {
    let Some(attr) = field.attrs.iter().find(|attr| attr.path().is_ident("import")) else {
        return Ok(FieldImport::Plain);
    };

    if let Meta::Path(_) = attr.meta {
        return Ok(FieldImport::Import {
            name: None,
            recompose: false,
        });
    }

    let mut name = None;
    let mut recompose = false;
    let mut flatten = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else if meta.path.is_ident("recompose") {
            recompose = true;
            Ok(())
        } else if meta.path.is_ident("flatten") {
            flatten = true;
            Ok(())
        } else {
            Err(meta.error("expects `name = \"...\"`, `recompose` or `flatten`"))
        }
    })?;

    if flatten {
        if name.is_some() || recompose {
            return Err(SynError::new(
                attr.span(),
                "`flatten` cannot be combined with `name` or `recompose`",
            ));
        }
        return Ok(FieldImport::Flatten);
    }

    Ok(FieldImport::Import { name, recompose })
}
