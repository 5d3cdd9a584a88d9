use std::sync::Arc;

use crate::error::{GrowError, Result};
use crate::geom::EQUI_TRIANGLE_H;
use crate::production::{Grammar, Production};
use crate::scheduler::Scheduler;
use crate::shape::Shape;

/// a named scene: a rule set plus the shapes it starts from
pub struct Preset {
    pub name: &'static str,
    pub productions: Vec<Arc<Production>>,
    pub seeds: Vec<Shape>,
}

impl std::fmt::Debug for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preset")
            .field("name", &self.name)
            .field("productions", &self.productions.len())
            .field("seeds", &self.seeds.len())
            .finish()
    }
}

impl Preset {
    pub const KEYS: [&'static str; 4] = ["tri", "sponge", "halfrect", "tiles"];

    /// build the scene `key` for a canvas of `width` x `height`; seeds are centered
    pub fn load(key: &str, width: f64, height: f64) -> Result<Self> {
        let (cx, cy) = (width / 2.0, height / 2.0);
        match key {
            "tri" => sierpinski(cx, cy),
            "sponge" => sponge(cx, cy),
            "halfrect" => half_cubes(cx, cy),
            "tiles" => tiles(cx, cy),
            other => Err(GrowError::UnknownPreset(other.to_owned())),
        }
    }

    /// Stop growth, clear the store, swap in this rule set and plant the seeds.
    /// Returns how many seeds landed inside the scheduler's bounds.
    pub fn install(self, scheduler: &mut Scheduler) -> usize {
        scheduler.reset();
        let planted = self.seeds.into_iter().filter_map(|s| scheduler.seed(s)).count();
        scheduler.set_productions(self.productions);
        tracing::info!(preset = self.name, planted, "preset loaded");
        planted
    }
}

// axis-aligned quad, wound (x0,y0) -> (x0,y1) -> (x1,y1) -> (x1,y0)
fn quad(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Shape> {
    Shape::new([(x0, y0), (x0, y1), (x1, y1), (x1, y0)])
}

fn sierpinski(cx: f64, cy: f64) -> Result<Preset> {
    let h = EQUI_TRIANGLE_H;
    let whole = || Shape::new([(0.0, 0.0), (50.0, -100.0 * h), (100.0, 0.0)]);

    let mut g = Grammar::new();
    // bottom left
    g.add(vec![whole()?], vec![Shape::new([(0.0, 0.0), (25.0, -50.0 * h), (50.0, 0.0)])?]);
    // top
    g.add(vec![whole()?], vec![Shape::new([(25.0, -50.0 * h), (50.0, -100.0 * h), (75.0, -50.0 * h)])?]);
    // bottom right
    g.add(vec![whole()?], vec![Shape::new([(50.0, 0.0), (75.0, -50.0 * h), (100.0, 0.0)])?]);

    let side = 512.0;
    let seed = Shape::new([
        (cx - side / 2.0, cy + side * h / 2.0),
        (cx, cy - side * h / 2.0),
        (cx + side / 2.0, cy + side * h / 2.0),
    ])?;
    Ok(Preset { name: "Sierpinski Triangle", productions: g.into_productions(), seeds: vec![seed] })
}

fn sponge(cx: f64, cy: f64) -> Result<Preset> {
    let mut g = Grammar::new();
    g.add(
        vec![quad(0.0, 0.0, 3.0, 3.0)?],
        vec![
            quad(-2.0, 4.0, -1.0, 5.0)?,
            quad(-2.0, -2.0, -1.0, -1.0)?,
            quad(4.0, -2.0, 5.0, -1.0)?,
            quad(4.0, 4.0, 5.0, 5.0)?,
            quad(1.0, -2.0, 2.0, -1.0)?,
            quad(1.0, 4.0, 2.0, 5.0)?,
            quad(-2.0, 1.0, -1.0, 2.0)?,
            quad(4.0, 1.0, 5.0, 2.0)?,
        ],
    );

    let s = 512.0;
    // the outer frame is skewed by one unit so the rule never fires on it
    let frame = Shape::new([
        (cx - s / 2.0, cy - s / 2.0),
        (cx - s / 2.0, cy + s / 2.0),
        (cx + s / 2.0, cy + s / 2.0 + 1.0),
        (cx + s / 2.0, cy - s / 2.0 + 1.0),
    ])?;
    let core = quad(cx - s / 6.0, cy - s / 6.0, cx + s / 6.0, cy + s / 6.0)?;
    Ok(Preset { name: "Menger Sponge", productions: g.into_productions(), seeds: vec![frame, core] })
}

fn half_cubes(cx: f64, cy: f64) -> Result<Preset> {
    let mut g = Grammar::new();
    let cube = || quad(0.0, 0.0, 64.0, 64.0);
    g.add(vec![cube()?], vec![quad(64.0, 0.0, 96.0, 32.0)?]);
    g.add(vec![cube()?], vec![quad(-32.0, 32.0, 0.0, 64.0)?]);
    g.add(vec![cube()?], vec![quad(32.0, 64.0, 64.0, 96.0)?]);
    g.add(vec![cube()?], vec![quad(0.0, -32.0, 32.0, 0.0)?]);

    let s = 256.0;
    let seed = quad(cx - s / 2.0, cy - s / 2.0, cx + s / 2.0, cy + s / 2.0)?;
    Ok(Preset { name: "Half Cubes", productions: g.into_productions(), seeds: vec![seed] })
}

fn tiles(cx: f64, cy: f64) -> Result<Preset> {
    let mut g = Grammar::new();
    let tall = || quad(0.0, 0.0, 16.0, 32.0);
    let wide = || quad(0.0, 0.0, 32.0, 16.0);
    g.add(vec![tall()?], vec![quad(16.0, 0.0, 48.0, 16.0)?]);
    g.add(vec![wide()?], vec![quad(0.0, 16.0, 16.0, 48.0)?]);
    g.add(vec![tall()?], vec![quad(-32.0, 16.0, 0.0, 32.0)?]);
    g.add(vec![wide()?], vec![quad(16.0, -32.0, 32.0, 0.0)?]);

    let seed = quad(cx - 16.0, cy - 8.0, cx + 16.0, cy + 8.0)?;
    Ok(Preset { name: "Tiles", productions: g.into_productions(), seeds: vec![seed] })
}
