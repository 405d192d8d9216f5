//! Problem definition and data structures for the pickup and delivery problem.
//!
//! Ports and vessels are indexed from zero. Cargoes are referred to by their
//! *id*, which starts at one so that zero can act as the barrier element in a
//! [`Solution`](crate::solution::Solution).

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// A cargo that must be picked up at one port and delivered at another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cargo {
    pub origin_port: usize,
    pub dest_port: usize,
    pub size: i64,
    /// Penalty paid when the cargo is left to the spot carrier
    pub not_transported_cost: i64,
    pub lower_pickup: i64,
    pub upper_pickup: i64,
    pub lower_delivery: i64,
    pub upper_delivery: i64,
}

impl Cargo {
    /// Create a new cargo.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        origin_port: usize,
        dest_port: usize,
        size: i64,
        not_transported_cost: i64,
        lower_pickup: i64,
        upper_pickup: i64,
        lower_delivery: i64,
        upper_delivery: i64,
    ) -> Self {
        Cargo {
            origin_port,
            dest_port,
            size,
            not_transported_cost,
            lower_pickup,
            upper_pickup,
            lower_delivery,
            upper_delivery,
        }
    }
}

/// A vessel of the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub home_port: usize,
    pub start_time: i64,
    pub capacity: i64,
    /// Ids of the cargoes this vessel is able to carry
    pub compatible: Vec<usize>,
}

impl Vessel {
    /// Create a new vessel.
    pub fn new(home_port: usize, start_time: i64, capacity: i64, compatible: Vec<usize>) -> Self {
        Vessel {
            home_port,
            start_time,
            capacity,
            compatible,
        }
    }
}

/// Time and cost of sailing a vessel between two ports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sailing {
    pub time: i64,
    pub cost: i64,
}

/// Time and cost a vessel spends at the origin and destination port of a cargo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortService {
    pub origin_time: i64,
    pub origin_cost: i64,
    pub dest_time: i64,
    pub dest_cost: i64,
}

/// A read-only pickup and delivery problem instance.
///
/// All lookup tables are dense and checked for completeness on construction,
/// so every lookup made while evaluating a solution is total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub name: String,
    pub nr_of_ports: usize,
    pub vessels: Vec<Vessel>,
    pub cargoes: Vec<Cargo>,
    /// `[vessel][from][to]` flattened
    sailings: Vec<Sailing>,
    /// `[vessel][cargo index]` flattened, `None` when incompatible
    services: Vec<Option<PortService>>,
}

impl Problem {
    /// Create a new problem.
    ///
    /// `sailings` is keyed by `(vessel, from port, to port)` and `services` by
    /// `(vessel, cargo id)`. Every vessel needs a sailing between every pair of
    /// ports and a port service entry for every cargo it is compatible with.
    pub fn new(
        name: String,
        nr_of_ports: usize,
        vessels: Vec<Vessel>,
        cargoes: Vec<Cargo>,
        sailings: impl IntoIterator<Item = ((usize, usize, usize), Sailing)>,
        services: impl IntoIterator<Item = ((usize, usize), PortService)>,
    ) -> Result<Self> {
        let nr_of_vessels = vessels.len();
        let nr_of_cargo = cargoes.len();

        if nr_of_vessels == 0 {
            bail!("Instance {}: at least one vessel is required", name);
        }

        for (i, cargo) in cargoes.iter().enumerate() {
            if cargo.origin_port >= nr_of_ports || cargo.dest_port >= nr_of_ports {
                bail!("Instance {}: cargo {} refers to an unknown port", name, i + 1);
            }
        }

        let mut compatibility = vec![false; nr_of_vessels * nr_of_cargo];
        for (v, vessel) in vessels.iter().enumerate() {
            if vessel.home_port >= nr_of_ports {
                bail!("Instance {}: vessel {} has an unknown home port", name, v + 1);
            }
            for &cargo_id in &vessel.compatible {
                if cargo_id == 0 || cargo_id > nr_of_cargo {
                    bail!(
                        "Instance {}: vessel {} is compatible with unknown cargo {}",
                        name,
                        v + 1,
                        cargo_id
                    );
                }
                compatibility[v * nr_of_cargo + cargo_id - 1] = true;
            }
        }

        let mut sailing_table = vec![None; nr_of_vessels * nr_of_ports * nr_of_ports];
        for ((v, from, to), sailing) in sailings {
            if v >= nr_of_vessels || from >= nr_of_ports || to >= nr_of_ports {
                bail!(
                    "Instance {}: sailing ({}, {}, {}) is out of range",
                    name,
                    v + 1,
                    from + 1,
                    to + 1
                );
            }
            sailing_table[(v * nr_of_ports + from) * nr_of_ports + to] = Some(sailing);
        }

        let sailings = sailing_table
            .into_iter()
            .enumerate()
            .map(|(i, sailing)| {
                sailing.ok_or_else(|| {
                    let v = i / (nr_of_ports * nr_of_ports);
                    let from = (i / nr_of_ports) % nr_of_ports;
                    let to = i % nr_of_ports;
                    anyhow!(
                        "Instance {}: missing sailing for vessel {} between ports {} and {}",
                        name,
                        v + 1,
                        from + 1,
                        to + 1
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut service_table = vec![None; nr_of_vessels * nr_of_cargo];
        for ((v, cargo_id), service) in services {
            if v >= nr_of_vessels || cargo_id == 0 || cargo_id > nr_of_cargo {
                bail!(
                    "Instance {}: port service ({}, {}) is out of range",
                    name,
                    v + 1,
                    cargo_id
                );
            }
            service_table[v * nr_of_cargo + cargo_id - 1] = Some(service);
        }

        for (i, compatible) in compatibility.iter().enumerate() {
            if *compatible && service_table[i].is_none() {
                bail!(
                    "Instance {}: vessel {} can carry cargo {} but has no port service entry",
                    name,
                    i / nr_of_cargo + 1,
                    i % nr_of_cargo + 1
                );
            }
            if !*compatible {
                service_table[i] = None;
            }
        }

        Ok(Problem {
            name,
            nr_of_ports,
            vessels,
            cargoes,
            sailings,
            services: service_table,
        })
    }

    /// Number of vessels in the fleet.
    pub fn nr_of_vessels(&self) -> usize {
        self.vessels.len()
    }

    /// Number of cargoes to transport.
    pub fn nr_of_cargo(&self) -> usize {
        self.cargoes.len()
    }

    /// Length of the sequence encoding a solution to this problem.
    pub fn solution_length(&self) -> usize {
        2 * self.nr_of_cargo() + self.nr_of_vessels()
    }

    /// Get a cargo by its id.
    pub fn cargo(&self, cargo_id: usize) -> &Cargo {
        &self.cargoes[cargo_id - 1]
    }

    /// Get a vessel by its index.
    pub fn vessel(&self, vessel: usize) -> &Vessel {
        &self.vessels[vessel]
    }

    /// Sailing time and cost for a vessel between two ports.
    #[inline]
    pub fn sailing(&self, vessel: usize, from: usize, to: usize) -> Sailing {
        self.sailings[(vessel * self.nr_of_ports + from) * self.nr_of_ports + to]
    }

    /// Port service of a vessel for a cargo, `None` if the vessel cannot carry it.
    #[inline]
    pub fn service(&self, vessel: usize, cargo_id: usize) -> Option<PortService> {
        self.services[vessel * self.nr_of_cargo() + cargo_id - 1]
    }

    /// Check if a vessel is able to carry a cargo.
    #[inline]
    pub fn can_carry(&self, vessel: usize, cargo_id: usize) -> bool {
        self.service(vessel, cargo_id).is_some()
    }

    /// Load a problem from a file. The file stem is used as the problem name.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read instance file {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());

        Self::parse(name, &content)
    }

    /// Parse a problem from the sectioned instance format.
    ///
    /// Sections are separated by lines starting with `%` and must appear in
    /// this order: number of ports, number of vessels, vessels, number of
    /// cargoes, vessel compatibility, cargoes, sailings, port services.
    /// Ports, vessels and cargoes are numbered from one in the file.
    pub fn parse(name: String, content: &str) -> Result<Self> {
        let mut sections: Vec<Vec<&str>> = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            if line.starts_with('%') {
                if !current.is_empty() {
                    sections.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.push(line);
        }
        if !current.is_empty() {
            sections.push(current);
        }

        if sections.len() < 8 {
            bail!(
                "Instance {}: expected 8 sections but found {}",
                name,
                sections.len()
            );
        }

        let nr_of_ports = parse_count(&sections[0], "number of ports")?;
        let nr_of_vessels = parse_count(&sections[1], "number of vessels")?;
        let nr_of_cargo = parse_count(&sections[3], "number of cargoes")?;

        if sections[2].len() != nr_of_vessels {
            bail!(
                "Instance {}: expected {} vessel lines but found {}",
                name,
                nr_of_vessels,
                sections[2].len()
            );
        }
        if sections[5].len() != nr_of_cargo {
            bail!(
                "Instance {}: expected {} cargo lines but found {}",
                name,
                nr_of_cargo,
                sections[5].len()
            );
        }

        let mut vessels = Vec::with_capacity(nr_of_vessels);
        for line in &sections[2] {
            let fields = parse_fields(line, 4, "vessel")?;
            let home_port = to_index(fields[1], nr_of_ports, "home port")?;
            vessels.push(Vessel::new(home_port, fields[2], fields[3], Vec::new()));
        }

        for line in &sections[4] {
            let fields = parse_fields(line, 1, "vessel compatibility")?;
            let vessel = to_index(fields[0], nr_of_vessels, "vessel")?;
            vessels[vessel].compatible = fields[1..]
                .iter()
                .map(|&id| to_index(id, nr_of_cargo, "cargo").map(|index| index + 1))
                .collect::<Result<Vec<_>>>()?;
        }

        let mut cargoes = Vec::with_capacity(nr_of_cargo);
        for line in &sections[5] {
            let f = parse_fields(line, 9, "cargo")?;
            cargoes.push(Cargo::new(
                to_index(f[1], nr_of_ports, "origin port")?,
                to_index(f[2], nr_of_ports, "destination port")?,
                f[3],
                f[4],
                f[5],
                f[6],
                f[7],
                f[8],
            ));
        }

        let mut sailings = Vec::with_capacity(sections[6].len());
        for line in &sections[6] {
            let f = parse_fields(line, 5, "sailing")?;
            let key = (
                to_index(f[0], nr_of_vessels, "vessel")?,
                to_index(f[1], nr_of_ports, "port")?,
                to_index(f[2], nr_of_ports, "port")?,
            );
            sailings.push((
                key,
                Sailing {
                    time: f[3],
                    cost: f[4],
                },
            ));
        }

        let mut services = Vec::with_capacity(sections[7].len());
        for line in &sections[7] {
            let f = parse_fields(line, 6, "port service")?;
            // -1 marks a vessel that cannot carry the cargo
            if f[2..].iter().any(|&value| value < 0) {
                continue;
            }
            let key = (
                to_index(f[0], nr_of_vessels, "vessel")?,
                to_index(f[1], nr_of_cargo, "cargo")? + 1,
            );
            services.push((
                key,
                PortService {
                    origin_time: f[2],
                    origin_cost: f[3],
                    dest_time: f[4],
                    dest_cost: f[5],
                },
            ));
        }

        Problem::new(name, nr_of_ports, vessels, cargoes, sailings, services)
    }
}

impl FromStr for Problem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Problem::parse("instance".to_string(), s)
    }
}

/// Parse a section holding a single count.
fn parse_count(section: &[&str], what: &str) -> Result<usize> {
    let line = section
        .first()
        .ok_or_else(|| anyhow!("Missing {}", what))?;
    line.trim()
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {} from '{}'", what, line))
}

/// Parse a comma separated line with at least `min` integer fields.
fn parse_fields(line: &str, min: usize, what: &str) -> Result<Vec<i64>> {
    let fields = line
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            field
                .parse::<i64>()
                .with_context(|| format!("Invalid {} field '{}' in line '{}'", what, field, line))
        })
        .collect::<Result<Vec<_>>>()?;

    if fields.len() < min {
        bail!(
            "Expected at least {} fields for {} but got {} in line '{}'",
            min,
            what,
            fields.len(),
            line
        );
    }
    Ok(fields)
}

/// Convert a one-based number from the instance file into a checked zero-based index.
fn to_index(value: i64, count: usize, what: &str) -> Result<usize> {
    if value < 1 || value as usize > count {
        bail!("{} {} is out of range 1..={}", what, value, count);
    }
    Ok(value as usize - 1)
}
