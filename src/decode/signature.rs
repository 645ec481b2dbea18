use alloy_primitives::{B256, keccak256};
use serde::Deserialize;

use crate::decode::value::AbiType;
use crate::models::errors::ParseError;

/// One declared parameter of an event or function.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<String>,
    pub ty: AbiType,
    pub indexed: bool,
}

/// Parsed event signature with its derived selector. The full keccak hash of
/// the canonical string is the topic0 value logs are matched on.
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    pub name: String,
    pub params: Vec<Param>,
    pub topic0: B256,
}

impl EventDescriptor {
    pub fn parse(signature: &str) -> Result<Self, ParseError> {
        let (name, params) = parse_signature(signature, "event")?;
        Ok(Self::from_params(name, params))
    }

    fn from_params(name: String, params: Vec<Param>) -> Self {
        let canonical = canonical_signature(&name, &params);
        let topic0 = keccak256(canonical.as_bytes());
        Self {
            name,
            params,
            topic0,
        }
    }

    pub fn canonical(&self) -> String {
        canonical_signature(&self.name, &self.params)
    }

    /// Declared types of the indexed parameters, in declaration order.
    pub fn indexed_types(&self) -> impl Iterator<Item = &AbiType> {
        self.params.iter().filter(|p| p.indexed).map(|p| &p.ty)
    }

    /// Declared types of the non-indexed parameters, in declaration order.
    pub fn body_types(&self) -> Vec<AbiType> {
        self.params
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.ty.clone())
            .collect()
    }
}

/// Parsed function signature. The leading four bytes of the keccak hash of
/// the canonical string form the call selector.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    pub name: String,
    pub params: Vec<Param>,
    pub selector: [u8; 4],
}

impl FunctionDescriptor {
    pub fn parse(signature: &str) -> Result<Self, ParseError> {
        let (name, params) = parse_signature(signature, "function")?;
        let canonical = canonical_signature(&name, &params);
        let hash = keccak256(canonical.as_bytes());
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&hash[..4]);
        Ok(Self {
            name,
            params,
            selector,
        })
    }

    pub fn canonical(&self) -> String {
        canonical_signature(&self.name, &self.params)
    }

    pub fn param_types(&self) -> Vec<AbiType> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }
}

/// Structured (JSON-ABI shaped) event fragment, accepted as an alternative
/// to the human-readable syntax.
#[derive(Debug, Clone, Deserialize)]
pub struct EventFragment {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ParamFragment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParamFragment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub components: Vec<ParamFragment>,
}

impl EventFragment {
    pub fn resolve(&self) -> Result<EventDescriptor, ParseError> {
        let params = self
            .inputs
            .iter()
            .map(|input| {
                Ok(Param {
                    name: if input.name.is_empty() {
                        None
                    } else {
                        Some(input.name.clone())
                    },
                    ty: resolve_fragment_type(input)?,
                    indexed: input.indexed,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(EventDescriptor::from_params(self.name.clone(), params))
    }
}

/// `tuple`-typed fragments carry their member types in `components`; the
/// remainder of the type string is the array suffix chain.
fn resolve_fragment_type(fragment: &ParamFragment) -> Result<AbiType, ParseError> {
    if let Some(suffix) = fragment.kind.strip_prefix("tuple") {
        let members = fragment
            .components
            .iter()
            .map(resolve_fragment_type)
            .collect::<Result<Vec<_>, ParseError>>()?;
        return apply_array_suffixes(AbiType::Tuple(members), suffix);
    }
    parse_type(&fragment.kind)
}

fn canonical_signature(name: &str, params: &[Param]) -> String {
    let types = params
        .iter()
        .map(|p| p.ty.canonical())
        .collect::<Vec<_>>()
        .join(",");
    format!("{name}({types})")
}

/// Parse `Name(type [indexed] [name], ...)` with an optional leading keyword
/// (`event` or `function`).
fn parse_signature(signature: &str, keyword: &str) -> Result<(String, Vec<Param>), ParseError> {
    let trimmed = signature.trim();
    let trimmed = trimmed
        .strip_prefix(keyword)
        .map(str::trim_start)
        .unwrap_or(trimmed);

    let open = trimmed
        .find('(')
        .ok_or_else(|| ParseError::MalformedSignature {
            reason: format!("no parameter list in '{signature}'"),
        })?;
    let name = trimmed[..open].trim();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(ParseError::MalformedSignature {
            reason: format!("invalid name '{name}'"),
        });
    }
    if !trimmed.ends_with(')') {
        return Err(ParseError::UnbalancedGrouping {
            signature: signature.to_owned(),
        });
    }

    let body = &trimmed[open + 1..trimmed.len() - 1];
    let mut params = Vec::new();
    for part in split_top_level(body, signature)? {
        params.push(parse_param(part)?);
    }
    Ok((name.to_owned(), params))
}

fn parse_param(param: &str) -> Result<Param, ParseError> {
    let mut tokens = param.split_whitespace();
    let type_str = tokens.next().ok_or_else(|| ParseError::MalformedParameter {
        param: param.to_owned(),
        reason: "empty parameter".to_owned(),
    })?;
    let ty = parse_type(type_str)?;

    let mut indexed = false;
    let mut name = None;
    for token in tokens {
        if token == "indexed" {
            indexed = true;
        } else if name.is_none() {
            name = Some(token.to_owned());
        } else {
            return Err(ParseError::MalformedParameter {
                param: param.to_owned(),
                reason: format!("unexpected token '{token}'"),
            });
        }
    }

    Ok(Param { name, ty, indexed })
}

/// Split on commas at nesting depth zero, trimming each piece. Rejects
/// unbalanced `()`/`[]` grouping.
fn split_top_level<'a>(body: &'a str, signature: &str) -> Result<Vec<&'a str>, ParseError> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedGrouping {
                        signature: signature.to_owned(),
                    });
                }
            }
            ',' if depth == 0 => {
                parts.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedGrouping {
            signature: signature.to_owned(),
        });
    }
    let last = body[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    } else if !parts.is_empty() {
        return Err(ParseError::MalformedSignature {
            reason: format!("trailing comma in '{signature}'"),
        });
    }
    Ok(parts)
}

/// Recursive descent over a type name: array suffixes from the right, tuple
/// syntax in parentheses, then the base type names.
fn parse_type(s: &str) -> Result<AbiType, ParseError> {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix(']') {
        let open = stripped.rfind('[').ok_or_else(|| ParseError::UnbalancedGrouping {
            signature: s.to_owned(),
        })?;
        let inner = parse_type(&stripped[..open])?;
        let index = &stripped[open + 1..];
        return if index.is_empty() {
            Ok(AbiType::Array(Box::new(inner)))
        } else {
            let len = index.parse().map_err(|_| ParseError::InvalidType {
                name: s.to_owned(),
            })?;
            Ok(AbiType::FixedArray(Box::new(inner), len))
        };
    }

    if let Some(stripped) = s.strip_prefix('(') {
        let body = stripped
            .strip_suffix(')')
            .ok_or_else(|| ParseError::UnbalancedGrouping {
                signature: s.to_owned(),
            })?;
        let members = split_top_level(body, s)?
            .into_iter()
            .map(parse_type)
            .collect::<Result<Vec<_>, ParseError>>()?;
        return Ok(AbiType::Tuple(members));
    }

    match s {
        "address" => return Ok(AbiType::Address),
        "bool" => return Ok(AbiType::Bool),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "uint" => return Ok(AbiType::Uint(256)),
        "int" => return Ok(AbiType::Int(256)),
        _ => {}
    }

    if let Some(bits) = s.strip_prefix("uint") {
        return Ok(AbiType::Uint(parse_bits(bits, s)?));
    }
    if let Some(bits) = s.strip_prefix("int") {
        return Ok(AbiType::Int(parse_bits(bits, s)?));
    }
    if let Some(size) = s.strip_prefix("bytes") {
        let size: usize = size.parse().map_err(|_| ParseError::InvalidType {
            name: s.to_owned(),
        })?;
        if size == 0 || size > 32 {
            return Err(ParseError::InvalidType { name: s.to_owned() });
        }
        return Ok(AbiType::FixedBytes(size));
    }

    Err(ParseError::InvalidType { name: s.to_owned() })
}

fn parse_bits(bits: &str, full: &str) -> Result<usize, ParseError> {
    let bits: usize = bits.parse().map_err(|_| ParseError::InvalidType {
        name: full.to_owned(),
    })?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(ParseError::InvalidType { name: full.to_owned() });
    }
    Ok(bits)
}

fn apply_array_suffixes(base: AbiType, suffixes: &str) -> Result<AbiType, ParseError> {
    let mut ty = base;
    let mut rest = suffixes;
    while !rest.is_empty() {
        let stripped = rest
            .strip_prefix('[')
            .ok_or_else(|| ParseError::InvalidType {
                name: suffixes.to_owned(),
            })?;
        let close = stripped.find(']').ok_or_else(|| ParseError::UnbalancedGrouping {
            signature: suffixes.to_owned(),
        })?;
        let index = &stripped[..close];
        ty = if index.is_empty() {
            AbiType::Array(Box::new(ty))
        } else {
            let len = index.parse().map_err(|_| ParseError::InvalidType {
                name: suffixes.to_owned(),
            })?;
            AbiType::FixedArray(Box::new(ty), len)
        };
        rest = &stripped[close + 1..];
    }
    Ok(ty)
}
