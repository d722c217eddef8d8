use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sandtable_control::{IntentSource, Peer, Skirmisher};
use sandtable_core::{
    ClearSight, HubEndpoint, LoopbackHub, Oracle, Replayer, Ruleset, SideId, Simulation,
    TerrainSight, UnitKind,
};
use sandtable_world::{load_document, load_ruleset, load_terrain, new_match_document, Terrain};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "sandtable", about = "Sandtable tactical simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a stored match document from one side's point of view.
    Replay {
        #[arg(long)]
        map: String,
        #[arg(long)]
        doc: String,
        #[arg(long)]
        side: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
    },
    /// Let two scripted peers play each other over an in-memory channel and
    /// check that they never disagree.
    Duel {
        #[arg(long, default_value = "./content/maps/ridge.txt")]
        map: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Seed for both autopilots. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 20)]
        turns: u32,
        /// Ignore terrain and units when testing lines of sight.
        #[arg(long)]
        clear_sight: bool,
        /// Write the final shared document here.
        #[arg(long)]
        out: Option<String>,
    },
}

type CliPeer = Peer<HubEndpoint, ChaCha8Rng>;

const HOST: &str = "red";
const GUEST: &str = "blue";
const SETTLE_ROUNDS: usize = 16;

fn oracle(clear_sight: bool) -> Box<dyn Oracle> {
    if clear_sight {
        Box::new(ClearSight)
    } else {
        Box::new(TerrainSight::default())
    }
}

// ---------------------------------------------------------------------------
// Replay
// ---------------------------------------------------------------------------

fn replay(map: &str, doc_path: &str, side: &str, content_dir: &str) -> Result<()> {
    let terrain = load_terrain(Path::new(map))?;
    let ruleset = load_ruleset(content_dir)?;
    let mut doc = load_document(Path::new(doc_path))?;
    let side = SideId::from(side);
    if doc.seat_of(&side).is_none() {
        bail!("{side} holds no seat in {doc_path}");
    }

    let mut sim = Simulation::from_document(terrain.grid, ruleset, &doc);
    let mut replayer = Replayer::new(side.clone(), &doc);
    let report = replayer
        .sync(&mut sim, &mut doc, &TerrainSight::default())
        .with_context(|| format!("replaying {doc_path}"))?;

    println!(
        "Replayed {} records for {side}: state={:?} cursor={} handed_over={}",
        report.applied,
        replayer.state(),
        replayer.cursor(),
        report.push,
    );
    println!("{}", "-".repeat(80));
    print_sides(&sim, [&doc.user1, &doc.user2]);
    Ok(())
}

// ---------------------------------------------------------------------------
// Duel
// ---------------------------------------------------------------------------

fn connect(
    hub: &LoopbackHub,
    side: &str,
    terrain: &Terrain,
    ruleset: &Ruleset,
    clear_sight: bool,
    seed: u64,
) -> Result<CliPeer> {
    Peer::connect(
        SideId::from(side),
        terrain.grid.clone(),
        ruleset.clone(),
        hub.endpoint(),
        oracle(clear_sight),
        ChaCha8Rng::seed_from_u64(seed),
    )
    .with_context(|| format!("connecting {side}"))
}

/// Pump both peers until the hub has nothing left to deliver.
fn settle(hub: &LoopbackHub, peers: &mut [CliPeer; 2]) -> Result<()> {
    for _ in 0..SETTLE_ROUNDS {
        if hub.pending() == 0 {
            return Ok(());
        }
        for peer in peers.iter_mut() {
            peer.pump()
                .with_context(|| format!("peer {} failed", peer.side()))?;
        }
    }
    bail!("peers still exchanging documents after {SETTLE_ROUNDS} rounds")
}

fn duel(
    map: &str,
    content_dir: &str,
    seed: Option<u64>,
    turns: u32,
    clear_sight: bool,
    out: Option<&str>,
) -> Result<()> {
    let terrain = load_terrain(Path::new(map))?;
    let ruleset = load_ruleset(content_dir)?;
    let seed = seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let hub = LoopbackHub::new(new_match_document(SideId::from(HOST), &terrain, &ruleset));
    let host = connect(&hub, HOST, &terrain, &ruleset, clear_sight, rng.gen())?;
    let guest = connect(&hub, GUEST, &terrain, &ruleset, clear_sight, rng.gen())?;
    let mut peers = [host, guest];
    let mut pilots = [
        Skirmisher::new(ChaCha8Rng::seed_from_u64(rng.gen())),
        Skirmisher::new(ChaCha8Rng::seed_from_u64(rng.gen())),
    ];
    settle(&hub, &mut peers)?;

    println!(
        "Starting duel: map={} seed={seed} turns={turns} flags={}",
        terrain.name,
        peers[0]
            .simulation()
            .units()
            .filter(|u| u.kind == UnitKind::Flag)
            .count(),
    );
    println!("{}", "-".repeat(80));

    for turn in 1..=turns {
        let Some(mover) = peers.iter().position(Peer::can_act) else {
            bail!("no side may act at turn {turn}");
        };
        let peer = &mut peers[mover];
        let intents = pilots[mover].plan_turn(peer.simulation(), peer.side(), peer.oracle());
        tracing::debug!(turn, side = %peer.side(), intents = intents.len(), "autopilot");
        for intent in intents {
            peer.enqueue(intent);
        }
        peer.run()
            .with_context(|| format!("turn {turn}: peer {} failed", peer.side()))?;
        settle(&hub, &mut peers)?;

        let [first, second] = &peers;
        if first.simulation().snapshot() != second.simulation().snapshot()
            || first.simulation().ledgers() != second.simulation().ledgers()
        {
            bail!("peers diverged after turn {turn}");
        }
        println!("[turn={turn:03}]");
        let doc = first.document();
        print_sides(first.simulation(), [&doc.user1, &doc.user2]);
    }

    println!("{}", "-".repeat(80));
    println!("Done. {} documents pushed, peers in lockstep.", hub.push_count());

    if let Some(path) = out {
        let doc = hub.document().context("hub lost its document")?;
        let file =
            std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
        serde_json::to_writer_pretty(file, &doc).with_context(|| format!("writing {path}"))?;
        println!("Final document written to {path}");
    }
    Ok(())
}

fn print_sides(sim: &Simulation, sides: [&SideId; 2]) {
    for side in sides {
        if side.is_neutral() {
            continue;
        }
        let units = sim.units_of(side).filter(|u| u.kind.is_combatant()).count();
        println!(
            "  {side:<8} units={units:3}  flags={}  force={:3}  points={}",
            sim.flags_owned_by(side),
            sim.force(side).unwrap_or(0),
            sim.committed_points(side),
        );
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay {
            map,
            doc,
            side,
            content_dir,
        } => replay(&map, &doc, &side, &content_dir)?,
        Commands::Duel {
            map,
            content_dir,
            seed,
            turns,
            clear_sight,
            out,
        } => duel(
            &map,
            &content_dir,
            seed,
            turns,
            clear_sight,
            out.as_deref(),
        )?,
    }
    Ok(())
}
