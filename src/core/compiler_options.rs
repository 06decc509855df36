//! Compiler options and their layered merge.
//!
//! Options can be declared at the project root, per configuration and per
//! target framework. Every field is optional so that an unset value
//! inherits from the less specific layer.

use serde::Serialize;
use serde_json::Value;

use crate::core::json::JsonObject;

/// Key of the compiler options sub-object.
pub const COMPILATION_OPTIONS_KEY: &str = "compilationOptions";

/// Compiler options for one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Preprocessor symbols, without duplicates
    #[serde(rename = "define", skip_serializing_if = "Vec::is_empty")]
    pub defines: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_unsafe: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings_as_errors: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,

    /// Strong-name key file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_sign: Option<bool>,

    /// Whether the output is an executable with an entry point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_entry_point: Option<bool>,
}

impl CompilerOptions {
    /// Built-in `Debug` configuration.
    pub fn debug() -> Self {
        CompilerOptions {
            defines: vec!["DEBUG".to_string(), "TRACE".to_string()],
            optimize: Some(false),
            ..Default::default()
        }
    }

    /// Built-in `Release` configuration.
    pub fn release() -> Self {
        CompilerOptions {
            defines: vec!["RELEASE".to_string(), "TRACE".to_string()],
            optimize: Some(true),
            ..Default::default()
        }
    }

    /// Read the `compilationOptions` sub-object of `obj`.
    ///
    /// Returns `None` when the sub-object is absent (or not an object); the
    /// caller substitutes defaults.
    pub fn from_json(obj: JsonObject<'_>) -> Option<Self> {
        obj.value_as_json_object(COMPILATION_OPTIONS_KEY)
            .map(Self::from_options_object)
    }

    /// Read options from the `compilationOptions` object itself.
    ///
    /// Values of the wrong type are ignored; unknown keys are ignored.
    pub fn from_options_object(options: JsonObject<'_>) -> Self {
        let mut result = CompilerOptions {
            defines: Vec::new(),
            language_version: options.value_as_string("languageVersion").map(str::to_string),
            allow_unsafe: options.value_as_nullable_boolean("allowUnsafe"),
            platform: options.value_as_string("platform").map(str::to_string),
            warnings_as_errors: options.value_as_nullable_boolean("warningsAsErrors"),
            optimize: options.value_as_nullable_boolean("optimize"),
            key_file: options.value_as_string("keyFile").map(str::to_string),
            delay_sign: options.value_as_nullable_boolean("delaySign"),
            emit_entry_point: options.value_as_nullable_boolean("emitEntryPoint"),
        };

        for define in options.value_as_string_array("define").unwrap_or_default() {
            result.add_define(define);
        }

        result
    }

    /// Add a define unless it is empty or already present.
    pub fn add_define(&mut self, define: impl Into<String>) {
        let define = define.into();
        if !define.is_empty() && !self.has_define(&define) {
            self.defines.push(define);
        }
    }

    pub fn has_define(&self, define: &str) -> bool {
        self.defines.iter().any(|d| d == define)
    }

    /// Apply `other` on top of `self`.
    ///
    /// Fields set in `other` win; defines are unioned.
    pub fn merge(&mut self, other: &CompilerOptions) {
        for define in &other.defines {
            self.add_define(define.clone());
        }
        if other.language_version.is_some() {
            self.language_version = other.language_version.clone();
        }
        if other.allow_unsafe.is_some() {
            self.allow_unsafe = other.allow_unsafe;
        }
        if other.platform.is_some() {
            self.platform = other.platform.clone();
        }
        if other.warnings_as_errors.is_some() {
            self.warnings_as_errors = other.warnings_as_errors;
        }
        if other.optimize.is_some() {
            self.optimize = other.optimize;
        }
        if other.key_file.is_some() {
            self.key_file = other.key_file.clone();
        }
        if other.delay_sign.is_some() {
            self.delay_sign = other.delay_sign;
        }
        if other.emit_entry_point.is_some() {
            self.emit_entry_point = other.emit_entry_point;
        }
    }

    /// Merge layers from least to most specific, starting from empty options.
    pub fn combine<'a>(layers: impl IntoIterator<Item = Option<&'a CompilerOptions>>) -> Self {
        let mut result = CompilerOptions::default();
        for layer in layers.into_iter().flatten() {
            result.merge(layer);
        }
        result
    }

    /// `root < configuration < framework` precedence.
    pub fn combine_layers(
        root: Option<&CompilerOptions>,
        configuration: Option<&CompilerOptions>,
        framework: Option<&CompilerOptions>,
    ) -> Self {
        Self::combine([root, configuration, framework])
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == CompilerOptions::default()
    }

    /// The manifest form of these options.
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Option<CompilerOptions> {
        let obj = JsonObject::from_value(&value).unwrap();
        CompilerOptions::from_json(obj)
    }

    #[test]
    fn test_absent_options() {
        assert!(options(json!({ "version": "1.0.0" })).is_none());
        assert!(options(json!({ "compilationOptions": "oops" })).is_none());
    }

    #[test]
    fn test_read_all_fields() {
        let opts = options(json!({
            "compilationOptions": {
                "define": ["FOO", "BAR", "FOO"],
                "languageVersion": "csharp6",
                "allowUnsafe": true,
                "platform": "x64",
                "warningsAsErrors": false,
                "optimize": true,
                "keyFile": "key.snk",
                "delaySign": true,
                "emitEntryPoint": true,
                "unknownKey": 1
            }
        }))
        .unwrap();

        assert_eq!(opts.defines, vec!["FOO", "BAR"]);
        assert_eq!(opts.language_version.as_deref(), Some("csharp6"));
        assert_eq!(opts.allow_unsafe, Some(true));
        assert_eq!(opts.platform.as_deref(), Some("x64"));
        assert_eq!(opts.warnings_as_errors, Some(false));
        assert_eq!(opts.optimize, Some(true));
        assert_eq!(opts.key_file.as_deref(), Some("key.snk"));
        assert_eq!(opts.delay_sign, Some(true));
        assert_eq!(opts.emit_entry_point, Some(true));
    }

    #[test]
    fn test_wrong_shapes_fall_back() {
        let opts = options(json!({
            "compilationOptions": { "define": "FOO", "optimize": "yes", "platform": 64 }
        }))
        .unwrap();
        assert!(opts.is_empty());
    }

    #[test]
    fn test_combine_unions_defines() {
        let root = CompilerOptions {
            defines: vec!["A".to_string()],
            ..Default::default()
        };
        let fw = CompilerOptions {
            defines: vec!["B".to_string()],
            ..Default::default()
        };

        let combined = CompilerOptions::combine_layers(Some(&root), None, Some(&fw));
        assert_eq!(combined.defines, vec!["A", "B"]);
    }

    #[test]
    fn test_combine_precedence() {
        let root = CompilerOptions {
            optimize: Some(false),
            platform: Some("anycpu".to_string()),
            ..Default::default()
        };
        let cfg = CompilerOptions {
            optimize: Some(true),
            ..Default::default()
        };
        let fw = CompilerOptions {
            platform: Some("x86".to_string()),
            ..Default::default()
        };

        let combined = CompilerOptions::combine_layers(Some(&root), Some(&cfg), Some(&CompilerOptions::default()));
        assert_eq!(combined.optimize, Some(true));
        assert_eq!(combined.platform.as_deref(), Some("anycpu"));

        let combined = CompilerOptions::combine_layers(Some(&root), Some(&cfg), Some(&fw));
        assert_eq!(combined.platform.as_deref(), Some("x86"));
    }

    #[test]
    fn test_explicit_false_overrides() {
        let cfg = CompilerOptions {
            allow_unsafe: Some(true),
            ..Default::default()
        };
        let fw = CompilerOptions {
            allow_unsafe: Some(false),
            ..Default::default()
        };
        let combined = CompilerOptions::combine_layers(None, Some(&cfg), Some(&fw));
        assert_eq!(combined.allow_unsafe, Some(false));
    }

    #[test]
    fn test_builtin_configurations() {
        assert!(CompilerOptions::debug().has_define("DEBUG"));
        assert_eq!(CompilerOptions::debug().optimize, Some(false));
        assert!(CompilerOptions::release().has_define("RELEASE"));
        assert_eq!(CompilerOptions::release().optimize, Some(true));
    }

    #[test]
    fn test_to_json_value_reads_back() {
        let opts = CompilerOptions {
            defines: vec!["X".to_string()],
            warnings_as_errors: Some(true),
            ..Default::default()
        };
        let value = opts.to_json_value();
        assert_eq!(value, json!({ "define": ["X"], "warningsAsErrors": true }));

        let reread = CompilerOptions::from_options_object(JsonObject::from_value(&value).unwrap());
        assert_eq!(reread, opts);
    }
}
