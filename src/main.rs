use anyhow::{Context, Result};
use afmg_world_import::{
    cli::{Cli, Commands},
    config::DatabaseLocation,
    filter::resolve_kinds,
    import::{file_candidates, import_world, reconcile_world, ImportOptions, ImportReport},
    metadata::DimensionResolver,
    schema::FeatureKind,
    ui::{LogUi, UiApp},
    writer::WorldStore,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn summary(report: &ImportReport) -> String {
    match &report.world_id {
        None => format!("Nothing to import for world '{}'", report.world),
        Some(id) => {
            let counts: Vec<String> = report
                .rows
                .iter()
                .map(|(kind, rows)| format!("{} {}", rows, kind))
                .collect();
            format!(
                "Imported world '{}' ({}): {} features [{}] in {:.1}s",
                report.world,
                id,
                report.total(),
                counts.join(", "),
                report.elapsed.as_secs_f64()
            )
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let verbose = cli.verbose;

    match cli.command {
        Commands::Import {
            world,
            dir,
            database,
            include,
            exclude,
            srid,
            tui,
        } => {
            if !tui {
                init_tracing(verbose);
            }

            let options = ImportOptions {
                kinds: resolve_kinds(include, exclude)?,
                default_srid: srid,
            };
            let location = DatabaseLocation::new(database)?;
            let mut store = WorldStore::open(location.path())?;
            let resolver = DimensionResolver::default();

            let outcome = if tui {
                let mut ui = UiApp::new(&world, &options.kinds)?;
                let outcome = import_world(&mut store, &world, &dir, &options, &resolver, &mut ui);
                ui.finish(outcome.as_ref())?;
                outcome
            } else {
                import_world(&mut store, &world, &dir, &options, &resolver, &mut LogUi)
            };

            let closed = store.close();
            let report = outcome.with_context(|| format!("Import of world '{}' failed", world))?;
            closed?;

            println!("{}", summary(&report));
        }

        Commands::Metadata { world, dir } => {
            init_tracing(verbose);

            let resolver = DimensionResolver::default();
            match reconcile_world(&world, &dir, &FeatureKind::ALL, &resolver, &mut LogUi)? {
                Some((_, metadata)) => println!("{}", serde_json::to_string_pretty(&metadata)?),
                None => println!("No export files found for world '{}'", world),
            }
        }

        Commands::ListWorlds { database } => {
            let location = DatabaseLocation::new(database)?;
            let store = WorldStore::open(location.path())?;
            let worlds = store.list_worlds()?;

            if worlds.is_empty() {
                println!("No worlds in {:?}", location.path());
            }
            for w in &worlds {
                println!(
                    "  {} ({})  {}x{} px @ {} m/px  updated {}",
                    w.name, w.id, w.width_pixels, w.height_pixels, w.meters_per_pixel, w.updated_at
                );
            }
            store.close()?;
        }

        Commands::ListKinds => {
            println!("Feature kinds (in import order):\n");
            for kind in FeatureKind::ALL {
                println!(
                    "  {:8} keyed by {:10} {}",
                    kind.name(),
                    kind.schema().local_id,
                    file_candidates("{world}", kind).join(" | ")
                );
            }
        }
    }

    Ok(())
}
