use std::path::PathBuf;

use alarmtimer_core::storage::sound_store;
use alarmtimer_core::SoundRegistry;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum SoundAction {
    /// List registered sounds in order
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a sound file where it already lives
    Add {
        /// Display name
        name: String,
        /// Path to the sound file
        file: PathBuf,
    },
    /// Copy an .mp3/.wav file into the managed sounds folder and register it
    Import {
        /// Display name
        name: String,
        /// File to copy
        source: PathBuf,
    },
    /// Rename a sound or point it at another file
    Edit {
        /// Current name
        name: String,
        /// New name (defaults to the current one)
        #[arg(long = "name", value_name = "NEW_NAME")]
        new_name: Option<String>,
        /// New file, referenced in place
        #[arg(long, conflicts_with = "import")]
        file: Option<PathBuf>,
        /// New file, copied into the managed folder
        #[arg(long)]
        import: Option<PathBuf>,
    },
    /// Remove a sound
    Remove {
        /// Name to remove
        name: String,
    },
}

pub fn run(action: SoundAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = SoundRegistry::open(sound_store()?);

    match action {
        SoundAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(registry.list())?);
            } else if registry.is_empty() {
                println!("no sounds registered");
            } else {
                for entry in registry.list() {
                    println!("{}\t{}", entry.name, entry.file.display());
                }
            }
        }
        SoundAction::Add { name, file } => {
            registry.add(&name, file)?;
            println!("added {}", name.trim());
        }
        SoundAction::Import { name, source } => {
            registry.import(&name, &source)?;
            let stored = registry.resolve(&name).map(|p| p.display().to_string());
            println!("imported {} -> {}", name.trim(), stored.unwrap_or_default());
        }
        SoundAction::Edit {
            name,
            new_name,
            file,
            import,
        } => {
            let new_name = new_name.unwrap_or_else(|| name.clone());
            match (file, import) {
                (_, Some(source)) => registry.edit_import(&name, &new_name, &source)?,
                (Some(file), None) => registry.edit(&name, &new_name, file)?,
                (None, None) => {
                    let current = registry
                        .resolve(&name)
                        .map(|p| p.to_path_buf())
                        .ok_or_else(|| format!("no sound named '{name}'"))?;
                    registry.edit(&name, &new_name, current)?;
                }
            }
            println!("updated {}", new_name.trim());
        }
        SoundAction::Remove { name } => {
            let removed = registry.remove(&name)?;
            println!("removed {}", removed.name);
        }
    }
    Ok(())
}
