//! [`figment`] provider reading the `[DEFAULT]` section of an INI file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::{
    Error, Metadata, Profile, Provider, Source,
    value::{Dict, Map, Value},
};
use ini::{Ini, ParseOption, Properties};

/// Name of the section holding the configuration keys.
const DEFAULT_SECTION: &str = "DEFAULT";

/// Deepest chain of `%(name)s` references followed before giving up.
const MAX_INTERPOLATION_DEPTH: usize = 10;

/// INI file provider.
///
/// Keys are read from the `[DEFAULT]` section, and from the lines written
/// before any section header. Key names are lowercased, values are kept as
/// text after `%` interpolation.
pub struct IniFile {
    path: PathBuf,
}

impl IniFile {
    /// Create a provider reading the INI file at `path`.
    pub fn file<P: AsRef<Path>>(path: P) -> Self {
        IniFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read(&self) -> Result<Dict, Error> {
        // Tokens and room ids are taken literally
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };

        let ini = Ini::load_from_file_opt(&self.path, options)
            .map_err(|e| Error::from(format!("failed to read {}: {}", self.path.display(), e)))?;

        let mut raw = BTreeMap::new();
        for name in [None, Some(DEFAULT_SECTION)] {
            if let Some(section) = ini.section(name) {
                collect(&mut raw, section);
            }
        }

        raw.iter()
            .map(|(key, value)| {
                let value = interpolate(&raw, key, value, 1).map_err(Error::from)?;
                Ok::<_, Error>((key.clone(), Value::from(value)))
            })
            .collect()
    }
}

fn collect(raw: &mut BTreeMap<String, String>, properties: &Properties) {
    for (key, value) in properties.iter() {
        raw.insert(key.trim().to_lowercase(), value.trim().to_string());
    }
}

/// Expands `%%` to `%` and `%(name)s` to the value of `name`.
///
/// Any other `%` is an error, as is a reference nested deeper than
/// [`MAX_INTERPOLATION_DEPTH`].
fn interpolate(
    raw: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    depth: usize,
) -> Result<String, String> {
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(format!("interpolation of `{key}` is nested too deeply"));
    }

    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('%') {
        expanded.push_str(&rest[..start]);
        let tail = &rest[start + 1..];

        if let Some(after) = tail.strip_prefix('%') {
            expanded.push('%');
            rest = after;
        } else if let Some(reference) = tail.strip_prefix('(') {
            let Some((name, after)) = reference.split_once(")s") else {
                return Err(format!("bad interpolation syntax in `{key}`: {value}"));
            };
            let name = name.to_lowercase();
            let Some(referenced) = raw.get(&name) else {
                return Err(format!("`{key}` references missing key `{name}`"));
            };
            expanded.push_str(&interpolate(raw, &name, referenced, depth + 1)?);
            rest = after;
        } else {
            return Err(format!(
                "`%` in `{key}` must be followed by `%` or `(name)s`: {value}"
            ));
        }
    }
    expanded.push_str(rest);

    Ok(expanded)
}

impl Provider for IniFile {
    fn metadata(&self) -> Metadata {
        Metadata::named("INI file").source(Source::File(self.path.clone()))
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        Ok(Profile::Default.collect(self.read()?))
    }
}
