//! Symbol layouts
//!
//! Where each symbol sits on screen. The engine never looks at this; views use it
//! to map symbols to cells and clicks back to symbols.
//!
//! The Corsi layout is generated once per session by rejection sampling: random
//! top-left corners are accepted only if the block stays clear of every block
//! already placed (plus padding).

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::engine::Symbol;

/// Maps symbols to positions
pub trait SymbolLayout: std::fmt::Debug {
    /// Size of the symbol space this layout covers
    fn symbol_count(&self) -> Symbol;

    /// Position of a symbol (grid cell or pixel corner), None if it has no place
    fn position(&self, symbol: Symbol) -> Option<IVec2>;

    /// Symbol at a position, if any
    fn symbol_at(&self, pos: IVec2) -> Option<Symbol> {
        (0..self.symbol_count()).find(|&s| self.position(s) == Some(pos))
    }
}

/// 3×3 grid, symbol = row * 3 + col
#[derive(Debug, Clone, Copy, Default)]
pub struct GridLayout;

impl SymbolLayout for GridLayout {
    fn symbol_count(&self) -> Symbol {
        9
    }

    fn position(&self, symbol: Symbol) -> Option<IVec2> {
        (symbol < 9).then(|| IVec2::new((symbol % 3) as i32, (symbol / 3) as i32))
    }
}

/// Phone-style digit pad: 1-9 in three rows, 0 centred underneath
#[derive(Debug, Clone, Copy, Default)]
pub struct KeypadLayout;

impl SymbolLayout for KeypadLayout {
    fn symbol_count(&self) -> Symbol {
        10
    }

    fn position(&self, symbol: Symbol) -> Option<IVec2> {
        match symbol {
            0 => Some(IVec2::new(1, 3)),
            1..=9 => {
                let n = (symbol - 1) as i32;
                Some(IVec2::new(n % 3, n / 3))
            }
            _ => None,
        }
    }
}

/// Corsi generator parameters (pixels)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockLayoutParams {
    pub canvas: IVec2,
    pub block_size: i32,
    /// Minimum distance from the canvas edge
    pub margin: i32,
    /// Minimum gap between two blocks
    pub padding: i32,
    pub count: Symbol,
    /// Placement attempts per block before giving up on it
    pub max_attempts: u32,
}

impl Default for BlockLayoutParams {
    fn default() -> Self {
        Self {
            canvas: IVec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            block_size: BLOCK_SIZE,
            margin: BLOCK_MARGIN,
            padding: BLOCK_PADDING,
            count: BLOCK_COUNT,
            max_attempts: BLOCK_MAX_ATTEMPTS,
        }
    }
}

/// One placed block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRect {
    /// Symbol this block stands for
    pub symbol: Symbol,
    pub top_left: IVec2,
    pub size: i32,
}

impl BlockRect {
    pub fn bottom_right(&self) -> IVec2 {
        self.top_left + IVec2::splat(self.size)
    }

    pub fn contains(&self, point: IVec2) -> bool {
        let br = self.bottom_right();
        point.x >= self.top_left.x
            && point.x < br.x
            && point.y >= self.top_left.y
            && point.y < br.y
    }

    /// True if the two blocks come within `padding` of each other
    pub fn overlaps_padded(&self, other: &BlockRect, padding: i32) -> bool {
        let (a, b) = (self.top_left, other.top_left);
        !(a.x + self.size + padding < b.x
            || a.x > b.x + other.size + padding
            || a.y + self.size + padding < b.y
            || a.y > b.y + other.size + padding)
    }
}

/// Place up to `params.count` non-overlapping blocks
///
/// Best effort: a block that finds no free spot within `max_attempts` samples is
/// left out, so the result may be shorter than `count`. Deterministic for a given
/// RNG state.
pub fn generate_blocks(params: &BlockLayoutParams, rng: &mut impl Rng) -> Vec<BlockRect> {
    let min = IVec2::splat(params.margin);
    let max = params.canvas - IVec2::splat(params.block_size + params.margin);
    if max.x < min.x || max.y < min.y {
        log::warn!(
            "Canvas {:?} too small for {}px blocks",
            params.canvas,
            params.block_size
        );
        return Vec::new();
    }

    let mut placed: Vec<BlockRect> = Vec::with_capacity(params.count as usize);
    for symbol in 0..params.count {
        let spot = (0..params.max_attempts).find_map(|_| {
            let candidate = BlockRect {
                symbol,
                top_left: IVec2::new(
                    rng.random_range(min.x..=max.x),
                    rng.random_range(min.y..=max.y),
                ),
                size: params.block_size,
            };
            let clear = !placed
                .iter()
                .any(|b| candidate.overlaps_padded(b, params.padding));
            clear.then_some(candidate)
        });
        match spot {
            Some(block) => placed.push(block),
            None => log::warn!(
                "Block {} omitted after {} attempts",
                symbol,
                params.max_attempts
            ),
        }
    }
    placed
}

/// Randomly placed Corsi blocks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockLayout {
    pub blocks: Vec<BlockRect>,
    count: Symbol,
}

impl BlockLayout {
    pub fn generate(params: &BlockLayoutParams, rng: &mut impl Rng) -> Self {
        Self {
            blocks: generate_blocks(params, rng),
            count: params.count,
        }
    }

    /// Block under a pixel, for click handling
    pub fn hit_test(&self, point: IVec2) -> Option<Symbol> {
        self.blocks.iter().find(|b| b.contains(point)).map(|b| b.symbol)
    }
}

impl SymbolLayout for BlockLayout {
    fn symbol_count(&self) -> Symbol {
        self.count
    }

    fn position(&self, symbol: Symbol) -> Option<IVec2> {
        self.blocks
            .iter()
            .find(|b| b.symbol == symbol)
            .map(|b| b.top_left)
    }
}
