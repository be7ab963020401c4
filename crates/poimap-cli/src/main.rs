mod device;

use clap::{Parser, Subcommand};
use poimap_core::{GeoPoint, MarkerKind, SearchRadius};
use poimap_discovery::{http_pipeline, LocationProvider, ManualPlace, Resolution};
use poimap_map::viewport_around;
use tracing_subscriber::EnvFilter;

use poimap_cli::{DiscoverySession, SessionDefaults};

#[derive(Debug, Parser)]
#[command(name = "poimap")]
#[command(about = "Discover and cluster nearby points of interest")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one discovery cycle and print POIs and clusters.
    Discover {
        /// Latitude of a manually selected place. Omit with --lng to use device location.
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
        /// Label for the selected place.
        #[arg(long)]
        label: Option<String>,
        /// Search radius in meters (clamped to 1000..=50000).
        #[arg(long, conflicts_with = "preset")]
        radius: Option<i64>,
        /// Index into the quick-select radii listed by `poimap radii`.
        #[arg(long)]
        preset: Option<usize>,
        #[arg(long, default_value_t = 14)]
        zoom: u8,
        #[arg(long, default_value_t = 1280)]
        width: u32,
        #[arg(long, default_value_t = 800)]
        height: u32,
    },
    /// List the quick-select search radii.
    Radii,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Discover {
            lat,
            lng,
            label,
            radius,
            preset,
            zoom,
            width,
            height,
        }) => {
            let place = lat.zip(lng).map(|(lat, lng)| ManualPlace {
                point: GeoPoint::new(lat, lng),
                label,
            });
            let radius = match (radius, preset) {
                (Some(meters), _) => RadiusChoice::Meters(meters),
                (None, Some(index)) => RadiusChoice::Preset(index),
                (None, None) => RadiusChoice::Configured,
            };
            run_discover(place, radius, zoom, width, height).await?;
        }
        Some(Commands::Radii) => {
            for (index, meters) in SearchRadius::QUICK_SELECT.into_iter().enumerate() {
                println!("{index}: {}", SearchRadius::clamped(i64::from(meters)));
            }
        }
        None => println!("poimap: use `poimap discover --lat <LAT> --lng <LNG>` or `poimap radii`"),
    }

    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum RadiusChoice {
    Configured,
    Meters(i64),
    Preset(usize),
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn run_discover(
    place: Option<ManualPlace>,
    radius: RadiusChoice,
    zoom: u8,
    width: u32,
    height: u32,
) -> anyhow::Result<()> {
    let config = poimap_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "configuration loaded");

    let mut session = DiscoverySession::new(
        http_pipeline(&config)?,
        LocationProvider::new(device::NoDeviceLocation),
        SessionDefaults::from_config(&config),
    );
    match radius {
        RadiusChoice::Configured => {}
        RadiusChoice::Meters(meters) => {
            session.set_radius(meters).await;
        }
        RadiusChoice::Preset(index) => {
            if session.quick_select_radius(index).await.is_none() {
                anyhow::bail!(
                    "unknown radius preset {index}; expected 0..{}",
                    SearchRadius::QUICK_SELECT.len()
                );
            }
        }
    }

    match place {
        Some(place) => session.select_place(place).await,
        None => {
            if let Resolution::Failed(failure) = session.locate().await {
                println!("Location unavailable: {}", failure.message());
                return Ok(());
            }
        }
    }

    if let Some(advisory) = session.advisory() {
        println!("{advisory}");
    }

    let label = session.place_label().unwrap_or("selected point");
    println!(
        "{} POIs within {} of {} ({label})",
        session.pois().len(),
        session.radius(),
        session.center(),
    );
    if let Some(stats) = session.last_stats() {
        println!(
            "  candidates: {}, public: {}, enriched: {}, dropped: {}",
            stats.candidates, stats.public, stats.enriched, stats.dropped
        );
    }
    for poi in session.pois() {
        println!("  \u{2022} {:<32} {}  [{}]", poi.title, poi.coordinates, poi.id);
    }

    let center = session.center();
    let clusters = session.update_viewport(viewport_around(center, zoom, width, height));
    println!("Markers at zoom {zoom} ({width}x{height}px): {}", clusters.len());
    for cluster in clusters {
        match cluster.marker_kind() {
            MarkerKind::Cluster => println!(
                "  cluster of {:>3} at {}: {}",
                cluster.count,
                cluster.centroid,
                cluster.member_ids.join(", ")
            ),
            _ => println!(
                "  single        at {}: {}",
                cluster.centroid,
                cluster.member_ids.join(", ")
            ),
        }
    }

    Ok(())
}
