use std::env;

use slicecore::{
    builder::{SliceBuilder, VmSpec},
    cli::{AnsiStyles, LinkArg, SegmentArg},
    config::{flavor, DEFAULT_IMAGE, KNOWN_IMAGES},
    management::{SliceStore, StaticPrincipal},
    models::{Slice, SliceStatus},
    SliceError, SliceResult,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

const DEFAULT_OWNER: &str = "operator";

//--------------------------------------------------------------------------------------------------
// Functions: Handlers
//--------------------------------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
pub async fn create_subcommand(
    store: &SliceStore,
    name: String,
    owner: Option<String>,
    segments: Vec<SegmentArg>,
    vms: Vec<String>,
    links: Vec<LinkArg>,
    image: Option<String>,
    internet: bool,
) -> SliceResult<()> {
    let principal = StaticPrincipal::operator(owner.unwrap_or_else(current_user));
    if let Some(image) = image.as_deref().filter(|image| !KNOWN_IMAGES.contains(image)) {
        tracing::warn!("image {} is not one of the known images", image);
    }

    let spec = |flavor: &str| match &image {
        Some(image) => VmSpec::builder().flavor(flavor).image(image).build(),
        None => VmSpec::with_flavor(flavor),
    };

    let mut builder = SliceBuilder::new(name)?;
    builder.set_internet_egress(internet)?;

    for segment in segments {
        let flavor = segment
            .flavor
            .as_deref()
            .unwrap_or(slicecore::config::DEFAULT_FLAVOR);
        let specs = (0..segment.count).map(|_| spec(flavor)).collect();
        builder.add_topology_segment(segment.kind, specs)?;
    }

    for flavor in &vms {
        builder.add_vm(spec(flavor))?;
    }

    for link in links {
        let (a, b) = link.indices();
        builder.add_manual_link(a, b)?;
    }

    println!("{}", builder.summary());

    let slice = store.create(&principal, builder.finalize()?).await?;
    println!(
        "{} {}",
        "created".valid(),
        slice.get_id().as_str().literal()
    );
    print_slice(&slice);

    Ok(())
}

pub async fn list_subcommand(store: &SliceStore, owner: Option<String>) {
    let slices = store.list(owner.as_deref()).await;
    if slices.is_empty() {
        println!("no slices");
        return;
    }

    println!(
        "{}",
        format!(
            "{:<20} {:<20} {:<16} {:>4} {:<9} {}",
            "ID", "NAME", "OWNER", "VLAN", "STATUS", "TOPOLOGY"
        )
        .header()
    );

    for slice in slices {
        println!(
            "{:<20} {:<20} {:<16} {:>4} {:<9} {}",
            slice.get_id(),
            slice.get_name(),
            slice.get_owner(),
            slice.get_vlan(),
            slice.get_status().name(),
            slice.get_topology()
        );
    }
}

pub async fn show_subcommand(store: &SliceStore, id: &str) -> SliceResult<()> {
    let slice = store.get(id).await.ok_or_else(|| not_found(id))?;
    print_slice(&slice);
    Ok(())
}

pub async fn status_subcommand(
    store: &SliceStore,
    id: &str,
    status: SliceStatus,
) -> SliceResult<()> {
    if !store.update_status(id, status).await? {
        return Err(not_found(id));
    }

    println!("{} is {}", id.literal(), status.to_string().valid());
    Ok(())
}

pub async fn delete_subcommand(store: &SliceStore, id: &str) -> SliceResult<()> {
    let principal = StaticPrincipal::operator(current_user());
    if !store.delete_as(&principal, id).await? {
        return Err(not_found(id));
    }

    println!("{} {}", "deleted".invalid(), id.literal());
    Ok(())
}

pub fn flavors_subcommand() {
    println!(
        "{}",
        format!("{:<8} {:>4} {:>9} {:>9}", "FLAVOR", "CPU", "RAM(MB)", "DISK(GB)").header()
    );

    for (flavor, specs) in flavor::list() {
        println!(
            "{:<8} {:>4} {:>9} {:>9}",
            flavor.name(),
            specs.cpu,
            specs.memory,
            specs.disk
        );
    }
}

pub fn images_subcommand() {
    println!("{}", "IMAGE".header());
    for image in KNOWN_IMAGES {
        if *image == DEFAULT_IMAGE {
            println!("{} {}", image, "(default)".placeholder());
        } else {
            println!("{}", image);
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn print_slice(slice: &Slice) {
    println!("{}", slice.get_name().header());
    println!("  {}  {}", "id".placeholder(), slice.get_id());
    println!("  {}  {}", "owner".placeholder(), slice.get_owner());
    println!("  {}  {}", "status".placeholder(), slice.get_status());
    println!("  {}  {}", "vlan".placeholder(), slice.get_vlan());
    println!("  {}  {}", "topology".placeholder(), slice.get_topology());
    println!("  {}  {}", "internet".placeholder(), slice.get_internet_egress());
    println!("  {}  {}", "created".placeholder(), slice.get_created_at().to_rfc3339());

    println!("  {}", "vms".placeholder());
    for vm in slice.get_vms() {
        println!(
            "    {:<5} {:<7} {:>2} cpu {:>6} MB {:>4} GB  {:<12} vnc {}",
            vm.get_name(),
            vm.get_flavor().name(),
            vm.get_cpu(),
            vm.get_memory(),
            vm.get_disk(),
            vm.get_ip(),
            vm.get_vnc_port()
        );
    }

    let vm_name = |index: usize| {
        slice
            .get_vms()
            .get(index)
            .map_or_else(|| format!("#{}", index), |vm| vm.get_name().clone())
    };
    let links: Vec<_> = slice
        .edges()
        .map(|link| format!("{}-{}", vm_name(link.a()), vm_name(link.b())))
        .collect();
    if !links.is_empty() {
        println!("  {}  {}", "links".placeholder(), links.join(", "));
    }
}

fn current_user() -> String {
    env::var("USER")
        .ok()
        .filter(|user| !user.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string())
}

fn not_found(id: &str) -> SliceError {
    SliceError::custom(anyhow::anyhow!("no slice with id '{}'", id))
}
