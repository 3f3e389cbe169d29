mod handlers;

use clap::{CommandFactory, Parser};
use slicecore::{
    cli::{SlicecoreArgs, SlicecoreSubcommand},
    management::SliceStore,
    models::SliceStatus,
    utils, SliceResult,
};
use tracing_subscriber::{fmt, EnvFilter};

//--------------------------------------------------------------------------------------------------
// Functions: main
//--------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() -> SliceResult<()> {
    let args = SlicecoreArgs::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let Some(subcommand) = args.subcommand else {
        SlicecoreArgs::command().print_help()?;
        return Ok(());
    };

    match subcommand {
        SlicecoreSubcommand::Flavors => {
            handlers::flavors_subcommand();
            return Ok(());
        }
        SlicecoreSubcommand::Images => {
            handlers::images_subcommand();
            return Ok(());
        }
        _ => {}
    }

    let store_path = args.store.unwrap_or_else(utils::get_default_store_path);
    tracing::debug!("using slice store at {}", store_path.display());
    let store = SliceStore::open(store_path).await?;

    match subcommand {
        SlicecoreSubcommand::Create {
            name,
            owner,
            segments,
            vms,
            links,
            image,
            internet,
        } => {
            tracing::trace!("creating slice: name={name}, owner={owner:?}, segments={segments:?}, vms={vms:?}, links={links:?}");
            handlers::create_subcommand(&store, name, owner, segments, vms, links, image, internet)
                .await?;
        }
        SlicecoreSubcommand::List { owner } => {
            handlers::list_subcommand(&store, owner).await;
        }
        SlicecoreSubcommand::Show { id } => {
            handlers::show_subcommand(&store, &id).await?;
        }
        SlicecoreSubcommand::Pause { id } => {
            handlers::status_subcommand(&store, &id, SliceStatus::Inactive).await?;
        }
        SlicecoreSubcommand::Resume { id } => {
            handlers::status_subcommand(&store, &id, SliceStatus::Active).await?;
        }
        SlicecoreSubcommand::Delete { id } => {
            handlers::delete_subcommand(&store, &id).await?;
        }
        SlicecoreSubcommand::Flavors => handlers::flavors_subcommand(),
        SlicecoreSubcommand::Images => handlers::images_subcommand(),
    }

    Ok(())
}
