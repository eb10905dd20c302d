use anyhow::{anyhow, bail, Context};
use std::str::FromStr;

/// The fixed per-tile capacities of a target machine.
/// A tile queries these once, when it is constructed.
pub trait Machine {
    /// Number of instructions that may be placed on a tile
    fn code_mem_depth(&self) -> usize;

    /// Number of words in a tile's data memory
    fn data_mem_depth(&self) -> usize;

    /// Number of scalar registers in a tile's register file
    fn register_count(&self) -> usize;
}

impl<M: Machine + ?Sized> Machine for &M {
    fn code_mem_depth(&self) -> usize {
        (**self).code_mem_depth()
    }

    fn data_mem_depth(&self) -> usize {
        (**self).data_mem_depth()
    }

    fn register_count(&self) -> usize {
        (**self).register_count()
    }
}

/// A plain capacity description.
///
/// It can be parsed from a small `key = value` text:
///
/// ```
/// use tile_alloc::MachineDescription;
///
/// fn main() -> anyhow::Result<()> {
///     let machine: MachineDescription = "
///         ## a tiny tile
///         code_mem_depth = 4
///         data_mem_depth = 8
///         register_count = 2
///     ".parse()?;
///     assert_eq!(machine, MachineDescription::new(4, 8, 2));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MachineDescription {
    pub code_mem_depth: usize,
    pub data_mem_depth: usize,
    pub register_count: usize,
}

impl MachineDescription {
    pub fn new(code_mem_depth: usize, data_mem_depth: usize, register_count: usize) -> Self {
        Self {
            code_mem_depth,
            data_mem_depth,
            register_count,
        }
    }

    /// Take a snapshot of the capacities of some other machine
    pub fn of<M: Machine + ?Sized>(machine: &M) -> Self {
        Self::new(
            machine.code_mem_depth(),
            machine.data_mem_depth(),
            machine.register_count(),
        )
    }
}

impl Machine for MachineDescription {
    fn code_mem_depth(&self) -> usize {
        self.code_mem_depth
    }

    fn data_mem_depth(&self) -> usize {
        self.data_mem_depth
    }

    fn register_count(&self) -> usize {
        self.register_count
    }
}

impl FromStr for MachineDescription {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> anyhow::Result<Self> {
        let mut code_mem_depth = None;
        let mut data_mem_depth = None;
        let mut register_count = None;

        for (idx, line) in text.lines().enumerate() {
            let line_number = idx + 1;
            let line = match line.find('#') {
                Some(comment) => &line[..comment],
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            let (key, value) = split_assignment(line)
                .ok_or_else(|| anyhow!("line {}: expected `key = value`", line_number))?;
            let value: usize = value
                .parse()
                .with_context(|| format!("line {}: invalid value for {}", line_number, key))?;

            let slot = match key {
                "code_mem_depth" => &mut code_mem_depth,
                "data_mem_depth" => &mut data_mem_depth,
                "register_count" => &mut register_count,
                _ => bail!("line {}: unknown machine parameter {:?}", line_number, key),
            };
            if slot.replace(value).is_some() {
                bail!("line {}: {} is specified more than once", line_number, key);
            }
        }

        Ok(Self {
            code_mem_depth: code_mem_depth.ok_or_else(|| anyhow!("missing code_mem_depth"))?,
            data_mem_depth: data_mem_depth.ok_or_else(|| anyhow!("missing data_mem_depth"))?,
            register_count: register_count.ok_or_else(|| anyhow!("missing register_count"))?,
        })
    }
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let eq = line.find('=')?;
    let key = line[..eq].trim();
    let value = line[eq + 1..].trim();
    if key.is_empty() || value.is_empty() {
        None
    } else {
        Some((key, value))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_description() -> anyhow::Result<()> {
        let machine: MachineDescription =
            "register_count=16\ncode_mem_depth = 256 # words\n\ndata_mem_depth = 128\n".parse()?;
        assert_eq!(machine, MachineDescription::new(256, 128, 16));
        assert_eq!(machine.code_mem_depth(), 256);
        assert_eq!(machine.data_mem_depth(), 128);
        assert_eq!(machine.register_count(), 16);
        Ok(())
    }

    #[test]
    fn parse_indented_description_with_comment_lines() -> anyhow::Result<()> {
        let machine: MachineDescription = "
            # a tiny tile
            code_mem_depth = 4
            data_mem_depth = 8
            register_count = 2
        "
        .parse()?;
        assert_eq!(machine, MachineDescription::new(4, 8, 2));
        Ok(())
    }

    #[test]
    fn parse_rejects_bad_descriptions() {
        let missing = "code_mem_depth = 1\ndata_mem_depth = 2\n"
            .parse::<MachineDescription>()
            .unwrap_err();
        assert_eq!(missing.to_string(), "missing register_count");

        let unknown = "code_mem_depth = 1\nflux = 3\n"
            .parse::<MachineDescription>()
            .unwrap_err();
        assert_eq!(
            unknown.to_string(),
            "line 2: unknown machine parameter \"flux\""
        );

        let twice = "register_count = 1\nregister_count = 2\n"
            .parse::<MachineDescription>()
            .unwrap_err();
        assert_eq!(
            twice.to_string(),
            "line 2: register_count is specified more than once"
        );

        assert!("code_mem_depth = -1".parse::<MachineDescription>().is_err());
        assert!("code_mem_depth".parse::<MachineDescription>().is_err());
    }

    #[test]
    fn snapshot_of_borrowed_machine() {
        let machine = MachineDescription::new(1, 2, 3);
        let borrowed: &dyn Machine = &machine;
        assert_eq!(MachineDescription::of(borrowed), machine);
        assert_eq!(MachineDescription::of(&&machine), machine);
    }
}
