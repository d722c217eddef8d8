//! Terrain, ruleset and document loading shared by the CLI and tests.

use anyhow::{bail, ensure, Context, Result};
use sandtable_core::{Grid, Rgb, Ruleset, SharedDocument, SideId, Tile, FLOOR_HEIGHT};
use serde::Deserialize;
use std::path::Path;

const WALL_HEIGHT: u8 = 3;
const WALL_COLOR: Rgb = Rgb::new(90, 90, 90);
const NEUTRAL_MARKER: Rgb = Rgb::new(128, 128, 128);
const FIRST_SEAT_MARKER: Rgb = Rgb::new(128, 128, 129);
const SECOND_SEAT_MARKER: Rgb = Rgb::new(128, 128, 130);

/// A named grid ready for a match.
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    pub name: String,
    pub grid: Grid,
}

#[derive(Deserialize)]
struct TerrainFile {
    name: String,
    width: i32,
    depth: i32,
    /// One row per z, one height per x.
    heights: Vec<Vec<u8>>,
    #[serde(default)]
    colors: Option<Vec<Vec<[u8; 3]>>>,
}

/// Load a terrain description. `.json` files hold explicit heights and
/// colours; anything else is read as an ASCII map named after the file.
pub fn load_terrain(path: &Path) -> Result<Terrain> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading terrain {}", path.display()))?;
    let terrain = if path.extension().is_some_and(|ext| ext == "json") {
        parse_terrain_json(&text)
    } else {
        let name = path
            .file_stem()
            .map_or_else(|| "unnamed".to_string(), |s| s.to_string_lossy().into_owned());
        parse_terrain_ascii(&name, &text)
    }
    .with_context(|| format!("parsing terrain {}", path.display()))?;
    tracing::debug!(
        name = %terrain.name,
        width = terrain.grid.width(),
        depth = terrain.grid.depth(),
        markers = terrain.grid.markers().count(),
        "terrain loaded"
    );
    Ok(terrain)
}

pub fn parse_terrain_json(text: &str) -> Result<Terrain> {
    let file: TerrainFile = serde_json::from_str(text).context("decoding terrain json")?;
    let rows = usize::try_from(file.depth).context("negative depth")?;
    let cols = usize::try_from(file.width).context("negative width")?;
    ensure!(
        file.heights.len() == rows,
        "expected {rows} height rows, got {}",
        file.heights.len()
    );
    if let Some(colors) = &file.colors {
        ensure!(
            colors.len() == rows,
            "expected {rows} colour rows, got {}",
            colors.len()
        );
    }

    let mut tiles = Vec::with_capacity(rows * cols);
    for (z, heights) in file.heights.iter().enumerate() {
        ensure!(
            heights.len() == cols,
            "height row {z} has {} entries, expected {cols}",
            heights.len()
        );
        let colors = file.colors.as_ref().map(|c| &c[z]);
        if let Some(colors) = colors {
            ensure!(
                colors.len() == cols,
                "colour row {z} has {} entries, expected {cols}",
                colors.len()
            );
        }
        for (x, &height) in heights.iter().enumerate() {
            let color = colors.map_or(Tile::floor().color, |c| {
                let [r, g, b] = c[x];
                Rgb::new(r, g, b)
            });
            tiles.push(Tile { height, color });
        }
    }
    let grid = Grid::new(file.width, file.depth, tiles).context("building grid")?;
    Ok(Terrain {
        name: file.name,
        grid,
    })
}

/// One character per cell: `.` floor, `#` wall, `1`-`9` explicit height,
/// `F` neutral marker, `A`/`B` first/second seat markers. Blank lines and
/// lines starting with `;` are skipped.
pub fn parse_terrain_ascii(name: &str, text: &str) -> Result<Terrain> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty() && !l.starts_with(';'))
        .collect();
    let Some(first) = rows.first() else {
        bail!("map has no rows");
    };
    let width = first.chars().count();

    let mut tiles = Vec::with_capacity(width * rows.len());
    for (z, row) in rows.iter().enumerate() {
        ensure!(
            row.chars().count() == width,
            "row {z} is {} wide, expected {width}",
            row.chars().count()
        );
        for (x, ch) in row.chars().enumerate() {
            let tile = match ch {
                '.' => Tile::floor(),
                '#' => Tile {
                    height: WALL_HEIGHT,
                    color: WALL_COLOR,
                },
                'F' => marker(NEUTRAL_MARKER),
                'A' => marker(FIRST_SEAT_MARKER),
                'B' => marker(SECOND_SEAT_MARKER),
                '1'..='9' => Tile {
                    height: ch as u8 - b'0',
                    ..Tile::floor()
                },
                other => bail!("unknown map symbol {other:?} at ({x}, {z})"),
            };
            tiles.push(tile);
        }
    }

    let width = i32::try_from(width).context("map too wide")?;
    let depth = i32::try_from(rows.len()).context("map too deep")?;
    let grid = Grid::new(width, depth, tiles).context("building grid")?;
    Ok(Terrain {
        name: name.to_string(),
        grid,
    })
}

fn marker(color: Rgb) -> Tile {
    Tile {
        height: FLOOR_HEIGHT,
        color,
    }
}

/// Load `ruleset.json` from the content directory. Missing fields take the
/// default rules.
pub fn load_ruleset(content_dir: &str) -> Result<Ruleset> {
    let path = Path::new(content_dir).join("ruleset.json");
    let ruleset: Ruleset = serde_json::from_str(
        &std::fs::read_to_string(&path).context("reading ruleset.json")?,
    )
    .context("parsing ruleset.json")?;
    ensure!(ruleset.starting_force > 0, "starting_force must be positive");
    Ok(ruleset)
}

/// A stored match document, as written by a replication store.
pub fn load_document(path: &Path) -> Result<SharedDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading document {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing document {}", path.display()))
}

/// Empty match on `terrain`, opened by `host` who moves first.
pub fn new_match_document(host: SideId, terrain: &Terrain, ruleset: &Ruleset) -> SharedDocument {
    SharedDocument::open(host, &terrain.name, ruleset.starting_force)
}
