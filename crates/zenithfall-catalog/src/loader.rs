//! RON content loader

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::schema::dungeon::DungeonFile;
use crate::schema::material::SchemaFile;
use crate::schema::race::RaceFile;
use crate::schema::recipe::RecipeFile;
use crate::validate;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use zenithfall_core::DefId;

/// Which of the four tables have been loaded
#[derive(Debug, Default)]
struct Loaded {
    materials: bool,
    recipes: bool,
    dungeons: bool,
    races: bool,
}

/// Loader for RON content tables
///
/// Each table may be loaded exactly once. [`Loader::finish`] refuses to
/// produce a catalog until all four are present and every cross-reference
/// resolves.
pub struct Loader {
    catalog: Catalog,
    loaded: Loaded,
}

fn insert_unique<T>(
    map: &mut IndexMap<DefId, T>,
    kind: &str,
    items: impl IntoIterator<Item = T>,
    id_of: impl Fn(&T) -> &DefId,
) -> Result<()> {
    for item in items {
        let id = id_of(&item).clone();
        if map.contains_key(&id) {
            return Err(Error::DuplicateDefinition(format!("{} {}", kind, id)));
        }
        map.insert(id, item);
    }
    Ok(())
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
            loaded: Loaded::default(),
        }
    }

    /// Load and validate every table found in a directory
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Catalog> {
        let mut loader = Self::new();
        loader.load_directory(path)?;
        loader.finish()
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if filename.contains("material") || content.contains("essences:") {
            self.load_materials_str(&content)
        } else if filename.contains("recipe") || content.contains("recipes:") {
            self.load_recipes_str(&content)
        } else if filename.contains("dungeon") || content.contains("dungeons:") {
            self.load_dungeons_str(&content)
        } else if filename.contains("race") || content.contains("races:") {
            self.load_races_str(&content)
        } else {
            Err(Error::InvalidSchema(format!(
                "{} is not a recognised content table",
                path.display()
            )))
        }
    }

    /// Load the material schema from a RON string
    pub fn load_materials_str(&mut self, content: &str) -> Result<()> {
        if self.loaded.materials {
            return Err(Error::DuplicateDefinition("materials table".to_string()));
        }
        let file: SchemaFile = ron::from_str(content)?;
        let schema = &mut self.catalog.schema;
        insert_unique(&mut schema.materials, "material", file.materials, |m| &m.id)?;
        insert_unique(&mut schema.essences, "essence", file.essences, |e| &e.id)?;
        schema.quality = file.quality;
        self.loaded.materials = true;
        Ok(())
    }

    /// Load recipes and catalysts from a RON string
    pub fn load_recipes_str(&mut self, content: &str) -> Result<()> {
        if self.loaded.recipes {
            return Err(Error::DuplicateDefinition("recipes table".to_string()));
        }
        let file: RecipeFile = ron::from_str(content)?;
        insert_unique(&mut self.catalog.catalysts, "catalyst", file.catalysts, |c| &c.id)?;
        insert_unique(&mut self.catalog.recipes, "recipe", file.recipes, |r| &r.id)?;
        self.loaded.recipes = true;
        Ok(())
    }

    /// Load dungeons, exploration rules and rank requirements from a RON string
    pub fn load_dungeons_str(&mut self, content: &str) -> Result<()> {
        if self.loaded.dungeons {
            return Err(Error::DuplicateDefinition("dungeons table".to_string()));
        }
        let file: DungeonFile = ron::from_str(content)?;
        insert_unique(&mut self.catalog.dungeons, "dungeon", file.dungeons, |d| &d.id)?;
        self.catalog.rules = file.rules;
        self.catalog.rank_requirements = file.rank_requirements;
        self.loaded.dungeons = true;
        Ok(())
    }

    /// Load races from a RON string
    pub fn load_races_str(&mut self, content: &str) -> Result<()> {
        if self.loaded.races {
            return Err(Error::DuplicateDefinition("races table".to_string()));
        }
        let file: RaceFile = ron::from_str(content)?;
        insert_unique(&mut self.catalog.races, "race", file.races, |r| &r.id)?;
        self.loaded.races = true;
        Ok(())
    }

    /// Load all RON files from a directory
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                tracing::debug!(file = %file_path.display(), "loading content table");
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Finish loading, validate and return the catalog
    pub fn finish(self) -> Result<Catalog> {
        let loaded = &self.loaded;
        if !loaded.materials {
            return Err(Error::MissingTable("materials"));
        }
        if !loaded.recipes {
            return Err(Error::MissingTable("recipes"));
        }
        if !loaded.dungeons {
            return Err(Error::MissingTable("dungeons"));
        }
        if !loaded.races {
            return Err(Error::MissingTable("races"));
        }

        validate::check(&self.catalog)?;

        tracing::info!(
            recipes = self.catalog.recipes.len(),
            catalysts = self.catalog.catalysts.len(),
            dungeons = self.catalog.dungeons.len(),
            races = self.catalog.races.len(),
            "catalog loaded"
        );
        Ok(self.catalog)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
