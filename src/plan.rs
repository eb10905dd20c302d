//! A line oriented placement plan that is replayed against a tile.
//!
//! ```text
//! # find-and-commit requests
//! inst 4        # earliest instruction slot at or after 4
//! array 3       # three contiguous data words
//! reg           # one register
//!
//! # direct commits, with no query first
//! inst@ 9
//! array@ 5 2
//! reg@ 1
//! ```
use anyhow::{anyhow, bail, ensure, Context};
use tile_alloc::{ResourceKind, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Instruction { hint: usize },
    InstructionAt { cycle: usize },
    Array { size: usize },
    ArrayAt { offset: usize, size: usize },
    Register,
    RegisterAt { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanLine {
    pub line_number: usize,
    pub request: Request,
}

/// Where a request landed.  `location` is `None` when the tile had no
/// room for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub kind: ResourceKind,
    pub location: Option<usize>,
    pub size: usize,
}

impl Placement {
    fn new(kind: ResourceKind, location: Option<usize>, size: usize) -> Self {
        Self {
            kind,
            location,
            size,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let kind = match self.kind {
            ResourceKind::Instruction => "inst",
            ResourceKind::DataWord => "array",
            ResourceKind::Register => "reg",
        };
        match (self.location, self.kind) {
            (None, ResourceKind::DataWord) => write!(fmt, "{} {} not-found", kind, self.size),
            (None, _) => write!(fmt, "{} not-found", kind),
            (Some(offset), ResourceKind::DataWord) => {
                write!(fmt, "{} {} @ {}", kind, self.size, offset)
            }
            (Some(index), _) => write!(fmt, "{} @ {}", kind, index),
        }
    }
}

fn parse_number(word: Option<&str>, what: &str) -> anyhow::Result<usize> {
    let word = word.ok_or_else(|| anyhow!("missing {}", what))?;
    word.parse()
        .with_context(|| format!("invalid {} {:?}", what, word))
}

fn parse_request(line: &str) -> anyhow::Result<Option<Request>> {
    let line = match line.find('#') {
        Some(comment) => &line[..comment],
        None => line,
    };
    let mut words = line.split_whitespace();
    let verb = match words.next() {
        Some(verb) => verb,
        None => return Ok(None),
    };

    let request = match verb {
        "inst" => Request::Instruction {
            hint: match words.next() {
                Some(word) => parse_number(Some(word), "hint")?,
                None => 0,
            },
        },
        "inst@" => Request::InstructionAt {
            cycle: parse_number(words.next(), "cycle")?,
        },
        "array" => Request::Array {
            size: parse_number(words.next(), "size")?,
        },
        "array@" => Request::ArrayAt {
            offset: parse_number(words.next(), "offset")?,
            size: parse_number(words.next(), "size")?,
        },
        "reg" => Request::Register,
        "reg@" => Request::RegisterAt {
            index: parse_number(words.next(), "register")?,
        },
        _ => bail!("unknown request {:?}", verb),
    };

    ensure!(
        words.next().is_none(),
        "trailing text after {:?} request",
        verb
    );
    Ok(Some(request))
}

pub fn parse_plan(text: &str) -> anyhow::Result<Vec<PlanLine>> {
    let mut plan = vec![];
    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;
        if let Some(request) =
            parse_request(line).with_context(|| format!("plan line {}", line_number))?
        {
            plan.push(PlanLine {
                line_number,
                request,
            });
        }
    }
    Ok(plan)
}

/// Apply each request to the tile in order.  Running out of room is
/// reported in the returned placements; a broken commit stops the replay.
pub fn replay(tile: &mut Tile, plan: &[PlanLine]) -> anyhow::Result<Vec<Placement>> {
    let mut placements = Vec::with_capacity(plan.len());
    for line in plan {
        let placement = apply(tile, line.request)
            .with_context(|| format!("plan line {}: {:?}", line.line_number, line.request))?;
        placements.push(placement);
    }
    Ok(placements)
}

fn apply(tile: &mut Tile, request: Request) -> anyhow::Result<Placement> {
    let placement = match request {
        Request::Instruction { hint } => {
            let found = tile.find_free_instruction(hint);
            if let Some(cycle) = found {
                tile.use_instruction(cycle)?;
            }
            Placement::new(ResourceKind::Instruction, found, 1)
        }
        Request::InstructionAt { cycle } => {
            tile.use_instruction(cycle)?;
            Placement::new(ResourceKind::Instruction, Some(cycle), 1)
        }
        Request::Array { size } => {
            let found = tile.find_free_array(size);
            if let Some(offset) = found {
                tile.use_array(offset, size)?;
            }
            Placement::new(ResourceKind::DataWord, found, size)
        }
        Request::ArrayAt { offset, size } => {
            tile.use_array(offset, size)?;
            Placement::new(ResourceKind::DataWord, Some(offset), size)
        }
        Request::Register => {
            let found = tile.find_free_register();
            if let Some(index) = found {
                tile.use_register(index)?;
            }
            Placement::new(ResourceKind::Register, found, 1)
        }
        Request::RegisterAt { index } => {
            tile.use_register(index)?;
            Placement::new(ResourceKind::Register, Some(index), 1)
        }
    };
    Ok(placement)
}
