// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use eyre::eyre;
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Yaml};
use muse_db::{DatabaseConfig, World, WorldFixture};
use muse_kernel::KernelConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The tool's config file. A `database` section replaces whatever config the world fixture
/// carries.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LockcConfig {
    pub database: Option<DatabaseConfig>,
    pub kernel: KernelConfig,
}

pub fn load_config(path: Option<&Path>) -> Result<LockcConfig, eyre::Report> {
    let Some(path) = path else {
        return Ok(LockcConfig::default());
    };
    Figment::new()
        .merge(Serialized::defaults(LockcConfig::default()))
        .merge(Yaml::file(path))
        .extract::<LockcConfig>()
        .map_err(|e| eyre!("Failed to parse configuration from {:?}: {}", path, e))
}

pub fn load_fixture(path: &Path) -> Result<WorldFixture, eyre::Report> {
    if !path.exists() {
        return Err(eyre!("World fixture {:?} does not exist", path));
    }
    let figment = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Figment::new().merge(Json::file(path)),
        _ => Figment::new().merge(Yaml::file(path)),
    };
    figment
        .extract::<WorldFixture>()
        .map_err(|e| eyre!("Failed to parse world fixture {:?}: {}", path, e))
}

pub fn load_world(fixture: &WorldFixture) -> Result<World, eyre::Report> {
    let world = World::from_fixture(fixture).map_err(|e| eyre!("Bad world fixture: {e}"))?;
    info!(objects = world.len(), "world ready");
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use muse_var::Obj;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_config_is_default() {
        assert_eq!(load_config(None).unwrap(), LockcConfig::default());
    }

    #[test]
    fn test_config_file() {
        let file = write_temp(
            ".yaml",
            "kernel:\n  max_lock_depth: 4\ndatabase:\n  attr_cache: false\n",
        );
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.kernel.max_lock_depth, 4);
        assert_eq!(config.kernel.buffer_len, KernelConfig::default().buffer_len);
        let database = config.database.unwrap();
        assert!(!database.attr_cache);
        assert_eq!(
            database.max_attr_defs,
            DatabaseConfig::default().max_attr_defs
        );
    }

    #[test]
    fn test_yaml_and_json_fixtures() {
        let yaml = write_temp(
            ".yaml",
            "objects:\n  - name: Hall\n    type: room\n  - name: Alice\n    type: player\n    location: 0\n",
        );
        let world = load_world(&load_fixture(yaml.path()).unwrap()).unwrap();
        assert_eq!(world.len(), 2);
        assert_eq!(world.name_of(Obj::mk_id(1)), "Alice");

        let json = write_temp(
            ".json",
            r#"{"objects": [{"name": "Hall", "type": "room"}]}"#,
        );
        let world = load_world(&load_fixture(json.path()).unwrap()).unwrap();
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_bad_fixture() {
        let file = write_temp(
            ".yaml",
            "objects:\n  - name: Alice\n    type: player\n    location: 5\n",
        );
        let fixture = load_fixture(file.path()).unwrap();
        assert!(load_world(&fixture).is_err());
        assert!(load_fixture(Path::new("/nonexistent/world.yaml")).is_err());
    }
}
