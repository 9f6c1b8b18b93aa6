use anyhow::{Context, Result, bail};
use clip::{ArgumentDecl, OptionDecl, Parser, ParserConfig, Scalar, ScalarType, TypeTag, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Declarations of one command line, as read from a JSON manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Program name used when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub show_errors: bool,

    #[serde(default)]
    pub options: Vec<OptionManifest>,

    #[serde(default)]
    pub arguments: Vec<ArgumentManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionManifest {
    pub short: char,
    pub long: String,

    /// Value placeholder in usage; the long key is shown when empty.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default = "default_type")]
    pub ty: String,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentManifest {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default = "default_type")]
    pub ty: String,

    #[serde(default)]
    pub multiple: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

fn default_type() -> String {
    "string".to_string()
}

impl Manifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse manifest JSON: {}", path.display()))
    }

    /// Register every declaration, in manifest order, on a fresh parser.
    pub fn build_parser(&self) -> Result<Parser<'static>> {
        let mut parser = Parser::with_config(ParserConfig {
            description: self.description.clone(),
            show_errors: self.show_errors,
        });
        for opt in &self.options {
            let decl = opt
                .to_decl()
                .with_context(|| format!("invalid option -{}({})", opt.short, opt.long))?;
            parser
                .add(decl)
                .with_context(|| format!("cannot declare option -{}({})", opt.short, opt.long))?;
        }
        for arg in &self.arguments {
            let decl = arg
                .to_decl()
                .with_context(|| format!("invalid argument {}", arg.name))?;
            parser
                .add(decl)
                .with_context(|| format!("cannot declare argument {}", arg.name))?;
        }
        tracing::debug!(
            options = self.options.len(),
            arguments = self.arguments.len(),
            "parser built from manifest"
        );
        Ok(parser)
    }
}

impl OptionManifest {
    pub fn to_decl(&self) -> Result<OptionDecl> {
        let tag = type_tag(&self.ty, self.multiple)?;
        let decl = OptionDecl::new(self.short, &self.long, &self.name, &self.description, tag);
        Ok(match &self.default {
            Some(default) => decl.with_default(default_value(default, tag)?),
            None => decl,
        })
    }
}

impl ArgumentManifest {
    pub fn to_decl(&self) -> Result<ArgumentDecl> {
        let tag = type_tag(&self.ty, self.multiple)?;
        let decl = ArgumentDecl::new(&self.name, &self.description, tag);
        Ok(match &self.default {
            Some(default) => decl.with_default(default_value(default, tag)?),
            None => decl,
        })
    }
}

/// Resolve a manifest type name (with a few aliases) to a scalar type.
pub fn scalar_type(name: &str) -> Result<ScalarType> {
    let ty = match name.trim().to_ascii_lowercase().as_str() {
        "bool" | "boolean" => ScalarType::Bool,
        "i32" => ScalarType::I32,
        "i64" | "int" => ScalarType::I64,
        "u32" => ScalarType::U32,
        "u64" | "uint" => ScalarType::U64,
        "usize" => ScalarType::Usize,
        "f32" => ScalarType::F32,
        "f64" | "float" => ScalarType::F64,
        "char" => ScalarType::Char,
        "string" | "str" => ScalarType::String,
        "path" => ScalarType::Path,
        other => bail!("unknown value type: {other}"),
    };
    Ok(ty)
}

fn type_tag(name: &str, multiple: bool) -> Result<TypeTag> {
    let scalar = scalar_type(name)?;
    Ok(if multiple {
        TypeTag::multi(scalar)
    } else {
        TypeTag::single(scalar)
    })
}

/// Convert a JSON default into a tagged value. Scalars go through the same
/// conversion as command line tokens.
fn default_value(json: &serde_json::Value, tag: TypeTag) -> Result<Value> {
    if tag.multi {
        let Some(items) = json.as_array() else {
            bail!("default of a {tag} declaration must be an array");
        };
        let scalars = items
            .iter()
            .map(|item| default_scalar(item, tag.scalar))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Value::Multi(scalars));
    }
    Ok(Value::Single(default_scalar(json, tag.scalar)?))
}

fn default_scalar(json: &serde_json::Value, ty: ScalarType) -> Result<Scalar> {
    let raw = match json {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => bail!("unsupported default value: {other}"),
    };
    Ok(ty.convert(&raw)?)
}
