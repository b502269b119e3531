// Copyright (c) Chris Gunn.
// Licensed under the MIT license.


use std::{fs, path::Path};

use tracing::trace;

use crate::{
    ast::{Expr, ExprCall, ExprIndex, SegmentFor, SegmentIf, TemplateSegment},
    config::Options,
    cow_yaml::{from_json_value, parse_yaml_str, single_entry, to_json_string, Map, Yaml},
    error::{Result, TransformError},
    keys::{GET_ATT_KEY, JOIN_KEY, REF_KEY},
    parser::Parser,
    template_spec::{Filter, TemplateSpec},
};

/// Wraps the JSON text produced by `raw()` so it can be told apart from literal
/// output after rendering.
pub const RAW_SENTINEL: &str = "@@@";

const MAX_RENDER_DEPTH: usize = 16;

/// Renders template text against a variable scope and the transform's options.
///
/// Tag expressions can call:
/// - `raw(value)`: embed `value` as structure (in `raw-join` output).
/// - `ref(name)`: `raw({"Ref": name})`.
/// - `getattr(resource, attribute)`: `raw({"GetAtt": [resource, attribute]})`.
/// - `localOption(name)`: the option value as plain text.
/// - `render(path)`: the rendered text of another template file.
///
/// The `cfn_` prefixed names of the old template dialect are accepted too.
///
/// `<% if %>` blocks treat `null` and `false` as false and every other value as
/// true. `<% for %>` binds one name per list item, or a key and a value per map
/// entry.
pub struct Renderer<'a> {
    parser: Parser,
    variables: &'a Map,
    options: &'a Options,
    base_dir: &'a Path,
    // Loop bindings, innermost last.
    scopes: Vec<Map>,
}

impl<'a> Renderer<'a> {
    pub fn new(variables: &'a Map, options: &'a Options, base_dir: &'a Path) -> Renderer<'a> {
        Renderer {
            parser: Parser::new(),
            variables,
            options,
            base_dir,
            scopes: Vec::new(),
        }
    }

    pub fn render_spec(spec: &TemplateSpec, options: &Options, base_dir: &Path) -> Result<Yaml> {
        let mut renderer = Renderer::new(&spec.variables, options, base_dir);
        match spec.filter {
            Filter::RawJoin => renderer.render_join(&spec.text),
            Filter::StructuredYaml => renderer.render_structured(&spec.text),
        }
    }

    /// Renders `text` and turns it into `{"Join": ["", [...]]}`, where literal
    /// text alternates with the structures embedded by `raw()`.
    pub fn render_join(&mut self, text: &str) -> Result<Yaml> {
        let rendered = self.render_text(text)?;

        let mut parts = Vec::new();
        for (index, chunk) in rendered.split(RAW_SENTINEL).enumerate() {
            // Chunks at odd positions were between a sentinel pair.
            if index % 2 == 1 {
                let value = serde_json::from_str(chunk).map_err(|err| TransformError::TemplateParseError {
                    fragment: chunk.to_string(),
                    message: err.to_string(),
                })?;
                parts.push(from_json_value(value));
            } else if !chunk.is_empty() {
                parts.push(Yaml::string(chunk));
            }
        }

        trace!(parts = parts.len(), "rendered join template");
        let join_args = Yaml::array(vec![Yaml::string(""), Yaml::array(parts)]);
        Ok(single_entry(JOIN_KEY, join_args))
    }

    /// Renders `text` and parses the output as a YAML document.
    pub fn render_structured(&mut self, text: &str) -> Result<Yaml> {
        let rendered = self.render_text(text)?;
        let docs = parse_yaml_str(&rendered).map_err(|err| TransformError::TemplateParseError {
            fragment: rendered.clone(),
            message: err.to_string(),
        })?;

        trace!(documents = docs.len(), "rendered structured template");
        Ok(docs.into_iter().next().unwrap_or(Yaml::Null))
    }

    pub fn render_text(&mut self, text: &str) -> Result<String> {
        self.render_text_at(text, 0)
    }

    fn render_text_at(&mut self, text: &str, depth: usize) -> Result<String> {
        let template = self.parser.parse(text)?;

        let mut out = String::with_capacity(text.len());
        self.render_segments(&template.segments, depth, &mut out)?;
        Ok(out)
    }

    fn render_segments(&mut self, segments: &[TemplateSegment], depth: usize, out: &mut String) -> Result<()> {
        for segment in segments {
            match segment {
                TemplateSegment::Text(text) => out.push_str(text),
                TemplateSegment::Expr(expr) => {
                    let value = self.eval(expr, depth)?;
                    out.push_str(&value.to_text());
                }
                TemplateSegment::If(if_segment) => self.render_if(if_segment, depth, out)?,
                TemplateSegment::For(for_segment) => self.render_for(for_segment, depth, out)?,
            }
        }
        Ok(())
    }

    fn render_if(&mut self, if_segment: &SegmentIf, depth: usize, out: &mut String) -> Result<()> {
        for branch in &if_segment.branches {
            if is_truthy(&self.eval(&branch.condition, depth)?) {
                return self.render_segments(&branch.body, depth, out);
            }
        }
        self.render_segments(&if_segment.otherwise, depth, out)
    }

    fn render_for(&mut self, for_segment: &SegmentFor, depth: usize, out: &mut String) -> Result<()> {
        let iterable = self.eval(&for_segment.iterable, depth)?;

        let mut iterations = Vec::new();
        match (&iterable, for_segment.bindings.as_slice()) {
            (Yaml::Array(list), [name]) => {
                for item in list.iter() {
                    let mut scope = Map::new();
                    scope.insert(name.clone(), item.clone());
                    iterations.push(scope);
                }
            }
            (Yaml::Hash(map), [key_name, value_name]) => {
                for (key, value) in map.iter() {
                    let mut scope = Map::new();
                    scope.insert(key_name.clone(), Yaml::string(key.as_str()));
                    scope.insert(value_name.clone(), value.clone());
                    iterations.push(scope);
                }
            }
            (Yaml::Array(_), bindings) | (Yaml::Hash(_), bindings) => {
                let expected = if matches!(iterable, Yaml::Array(_)) { 1 } else { 2 };
                return Err(render_error(format!(
                    "loop over a {} takes {} binding(s), {} given",
                    iterable.type_name(),
                    expected,
                    bindings.len()
                )));
            }
            (other, _) => {
                return Err(render_error(format!(
                    "value of type {} is not iterable",
                    other.type_name()
                )))
            }
        }

        for scope in iterations {
            self.scopes.push(scope);
            let rendered = self.render_segments(&for_segment.body, depth, out);
            self.scopes.pop();
            rendered?;
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr, depth: usize) -> Result<Yaml> {
        match expr {
            Expr::String(string) => Ok(Yaml::String(string.value.clone())),
            Expr::Integer(integer) => Ok(Yaml::Integer(integer.value)),
            Expr::Real(real) => Ok(Yaml::Real(real.value.clone())),
            Expr::True => Ok(Yaml::Boolean(true)),
            Expr::False => Ok(Yaml::Boolean(false)),
            Expr::Null => Ok(Yaml::Null),
            Expr::Var(ident) => self
                .scopes
                .iter()
                .rev()
                .find_map(|scope| scope.get(&ident.name))
                .or_else(|| self.variables.get(&ident.name))
                .cloned()
                .ok_or_else(|| render_error(format!("cannot find variable '{}'", ident.name))),
            Expr::Index(index) => self.eval_index(index, depth),
            Expr::Array(array) => {
                let mut values = Vec::with_capacity(array.values.len());
                for value in &array.values {
                    values.push(self.eval(value, depth)?);
                }
                Ok(Yaml::array(values))
            }
            Expr::Object(object) => {
                let mut map = Map::new();
                for (key, value) in &object.entries {
                    map.insert(key.clone(), self.eval(value, depth)?);
                }
                Ok(Yaml::hash(map))
            }
            Expr::Call(call) => self.eval_call(call, depth),
            Expr::Eq(op) => {
                let left = self.eval(&op.left, depth)?;
                let right = self.eval(&op.right, depth)?;
                Ok(Yaml::Boolean(left == right))
            }
            Expr::Ne(op) => {
                let left = self.eval(&op.left, depth)?;
                let right = self.eval(&op.right, depth)?;
                Ok(Yaml::Boolean(left != right))
            }
        }
    }

    fn eval_index(&mut self, index: &ExprIndex, depth: usize) -> Result<Yaml> {
        let object = self.eval(&index.object, depth)?;
        let key = self.eval(&index.index, depth)?;
        match (&object, &key) {
            (Yaml::Hash(map), Yaml::String(name)) => map
                .get(name.as_str())
                .cloned()
                .ok_or_else(|| render_error(format!("index {:?} not found", name))),
            (Yaml::Array(list), Yaml::Integer(position)) => usize::try_from(*position)
                .ok()
                .and_then(|position| list.get(position))
                .cloned()
                .ok_or_else(|| render_error(format!("index {} is out of bounds", position))),
            _ => Err(render_error(format!(
                "cannot index a {} with a {}",
                object.type_name(),
                key.type_name()
            ))),
        }
    }

    fn eval_call(&mut self, call: &ExprCall, depth: usize) -> Result<Yaml> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval(arg, depth)?);
        }

        match call.name.as_str() {
            "raw" | "cfn_raw" => {
                let [value] = expect_args::<1>(call, args)?;
                Ok(raw(&value))
            }
            "ref" | "cfn_ref" => {
                let [name] = expect_args::<1>(call, args)?;
                Ok(raw(&single_entry(REF_KEY, name)))
            }
            "getattr" | "cfn_getatt" => {
                let [resource, attribute] = expect_args::<2>(call, args)?;
                Ok(raw(&single_entry(GET_ATT_KEY, Yaml::array(vec![resource, attribute]))))
            }
            "localOption" | "cfn_cfnpp_ref" => {
                let [name] = expect_args::<1>(call, args)?;
                let name = name.to_text();
                match self.options.get(&name) {
                    Some(value) => Ok(Yaml::string(value.clone().unwrap_or_default())),
                    None => Err(TransformError::MissingOptionValue { name }),
                }
            }
            "render" | "cfn_render" => {
                let [path] = expect_args::<1>(call, args)?;
                if depth + 1 > MAX_RENDER_DEPTH {
                    return Err(render_error(format!(
                        "render() nested deeper than {} levels",
                        MAX_RENDER_DEPTH
                    )));
                }
                let path = self.base_dir.join(path.to_text());
                let text =
                    fs::read_to_string(&path).map_err(|source| TransformError::MissingTemplateSource { path, source })?;
                let rendered = self.render_text_at(&text, depth + 1)?;
                Ok(Yaml::string(rendered))
            }
            name => Err(render_error(format!("unknown function '{}'", name))),
        }
    }
}

fn is_truthy(value: &Yaml) -> bool {
    !matches!(value, Yaml::Null | Yaml::Boolean(false))
}

fn raw(value: &Yaml) -> Yaml {
    Yaml::string(format!("{}{}{}", RAW_SENTINEL, to_json_string(value), RAW_SENTINEL))
}

fn expect_args<const N: usize>(call: &ExprCall, args: Vec<Yaml>) -> Result<[Yaml; N]> {
    let count = args.len();
    <[Yaml; N]>::try_from(args).map_err(|_| {
        render_error(format!(
            "{}() takes {} argument(s), {} given",
            call.name, N, count
        ))
    })
}

fn render_error(message: String) -> TransformError {
    TransformError::TemplateRender { message }
}
