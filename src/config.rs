use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Settings file used when none is given on the command line.
pub const DEFAULT_SETTINGS_FILE: &str = "settings.yaml";

fn default_org_code() -> String {
    "ANI".to_string()
}

/// Contents of the YAML settings file.
///
/// ```yaml
/// input_dir: input-folder
/// output_dir: output
/// staging_csv: temp_data.csv
/// org_code: ANI   # optional
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Root holding the `Mon-YYYY` folders.
    pub input_dir: PathBuf,
    /// Where the consolidated workbooks are written.
    pub output_dir: PathBuf,
    /// Intermediate CSV dump of the staged rows.
    pub staging_csv: PathBuf,
    /// Organisation code stamped on every row and used as the report prefix.
    #[serde(default = "default_org_code")]
    pub org_code: String,
}

impl Settings {
    /// Read and parse a settings file. Relative paths inside it are resolved
    /// against the directory the file lives in.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("settings file `{}` not found", path.display());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let mut settings: Settings = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        settings.input_dir = resolve(base, &settings.input_dir);
        settings.output_dir = resolve(base, &settings.output_dir);
        settings.staging_csv = resolve(base, &settings.staging_csv);
        debug!(?settings, "loaded settings");
        Ok(settings)
    }

    /// Both directories must exist before any folder is scanned.
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            bail!(
                "input directory `{}` does not exist or is not a directory",
                self.input_dir.display()
            );
        }
        if !self.output_dir.is_dir() {
            bail!(
                "output directory `{}` does not exist or is not a directory",
                self.output_dir.display()
            );
        }
        if self.org_code.trim().is_empty() {
            bail!("org_code must not be empty");
        }
        Ok(())
    }
}

fn resolve(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load("/definitely/not/here/settings.yaml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn relative_paths_and_default_org() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("settings.yaml");
        fs::write(
            &path,
            "input_dir: input-folder\noutput_dir: /abs/output\nstaging_csv: temp_data.csv\n",
        )?;
        let s = Settings::load(&path)?;
        assert_eq!(s.input_dir, dir.path().join("input-folder"));
        assert_eq!(s.output_dir, PathBuf::from("/abs/output"));
        assert_eq!(s.staging_csv, dir.path().join("temp_data.csv"));
        assert_eq!(s.org_code, "ANI");
        Ok(())
    }

    #[test]
    fn missing_key_fails_to_parse() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "input_dir: in\n")?;
        assert!(Settings::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn validate_checks_directories_up_front() -> Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("in"))?;
        let mut s = Settings {
            input_dir: dir.path().join("in"),
            output_dir: dir.path().join("out"),
            staging_csv: dir.path().join("temp.csv"),
            org_code: "ANI".into(),
        };
        assert!(s.validate().unwrap_err().to_string().contains("output directory"));

        fs::create_dir(dir.path().join("out"))?;
        s.validate()?;

        s.input_dir = dir.path().join("missing");
        assert!(s.validate().unwrap_err().to_string().contains("input directory"));
        Ok(())
    }
}
