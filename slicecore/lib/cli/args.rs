use std::{fmt, path::PathBuf, str::FromStr};

use clap::Parser;

use crate::{cli::styles, topology::TopologyKind};

//-------------------------------------------------------------------------------------------------
// Types
//-------------------------------------------------------------------------------------------------

/// `slicecore` assembles virtual machines into network topologies and manages the resulting
/// slices
#[derive(Debug, Parser)]
#[command(name = "slicecore", author, version, styles=styles::styles())]
pub struct SlicecoreArgs {
    /// The subcommand to run
    #[command(subcommand)]
    pub subcommand: Option<SlicecoreSubcommand>,

    /// The slice store file. `.yaml` and `.yml` files are stored as YAML, anything else as JSON
    #[arg(short, long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands for managing slices
#[derive(Debug, Parser)]
pub enum SlicecoreSubcommand {
    /// Build a slice and store it
    ///
    /// VMs are numbered in the order they are added: segments first, in the order given, then
    /// the standalone VMs.
    #[command(name = "create")]
    Create {
        /// Name of the slice
        #[arg(short, long)]
        name: String,

        /// Owner of the slice. Defaults to the current user
        #[arg(short, long)]
        owner: Option<String>,

        /// Topology segment as `<linear|ring|tree>:<count>[:<flavor>]`
        #[arg(long = "segment", value_name = "KIND:COUNT[:FLAVOR]")]
        segments: Vec<SegmentArg>,

        /// Standalone VM of the given flavor
        #[arg(long = "vm", value_name = "FLAVOR")]
        vms: Vec<String>,

        /// Link between two VMs as `<a>-<b>`, numbered from 1
        #[arg(long = "link", value_name = "A-B")]
        links: Vec<LinkArg>,

        /// Disk image for every VM. `slicecore images` lists the known images and the default
        #[arg(short, long)]
        image: Option<String>,

        /// Give the slice outbound internet access
        #[arg(long)]
        internet: bool,
    },

    /// List slices
    #[command(name = "list")]
    List {
        /// Only list the slices of this owner
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Show a slice and its VMs
    #[command(name = "show")]
    Show {
        /// Id of the slice
        #[arg(required = true)]
        id: String,
    },

    /// Mark a slice inactive
    #[command(name = "pause")]
    Pause {
        /// Id of the slice
        #[arg(required = true)]
        id: String,
    },

    /// Mark a slice active again
    #[command(name = "resume")]
    Resume {
        /// Id of the slice
        #[arg(required = true)]
        id: String,
    },

    /// Delete a slice and its VMs
    #[command(name = "delete")]
    Delete {
        /// Id of the slice
        #[arg(required = true)]
        id: String,
    },

    /// List the available VM flavors
    #[command(name = "flavors")]
    Flavors,

    /// List the known VM disk images
    #[command(name = "images")]
    Images,
}

/// A topology segment given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentArg {
    /// The pattern.
    pub kind: TopologyKind,

    /// The number of VMs.
    pub count: usize,

    /// The flavor of every VM in the segment.
    pub flavor: Option<String>,
}

/// A link given on the command line, with 1-based VM numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkArg {
    /// The first VM number.
    pub a: usize,

    /// The second VM number.
    pub b: usize,
}

//-------------------------------------------------------------------------------------------------
// Methods
//-------------------------------------------------------------------------------------------------

impl LinkArg {
    /// Returns both ends as 0-based VM indices.
    pub fn indices(&self) -> (usize, usize) {
        (self.a - 1, self.b - 1)
    }
}

//-------------------------------------------------------------------------------------------------
// Trait Implementations
//-------------------------------------------------------------------------------------------------

impl FromStr for SegmentArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(kind), Some(count)) = (parts.next(), parts.next()) else {
            return Err(format!("expected KIND:COUNT[:FLAVOR], got '{}'", s));
        };

        let kind = kind.parse::<TopologyKind>().map_err(|e| e.to_string())?;
        let count = count
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid VM count '{}'", count))?;
        let flavor = parts
            .next()
            .map(str::trim)
            .filter(|flavor| !flavor.is_empty())
            .map(str::to_string);

        if parts.next().is_some() {
            return Err(format!("expected KIND:COUNT[:FLAVOR], got '{}'", s));
        }

        Ok(Self {
            kind,
            count,
            flavor,
        })
    }
}

impl FromStr for LinkArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((a, b)) = s.split_once('-') else {
            return Err(format!("expected A-B, got '{}'", s));
        };

        let parse = |n: &str| match n.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("invalid VM number '{}', numbering starts at 1", n)),
            Ok(n) => Ok(n),
        };

        Ok(Self {
            a: parse(a)?,
            b: parse(b)?,
        })
    }
}

impl fmt::Display for SegmentArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.count)?;
        if let Some(flavor) = &self.flavor {
            write!(f, ":{}", flavor)?;
        }
        Ok(())
    }
}

//-------------------------------------------------------------------------------------------------
// Tests
//-------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_arg_parse() {
        assert_eq!(
            "ring:4".parse::<SegmentArg>().unwrap(),
            SegmentArg {
                kind: TopologyKind::Ring,
                count: 4,
                flavor: None
            }
        );

        let segment = "Tree:5:large".parse::<SegmentArg>().unwrap();
        assert_eq!(segment.kind, TopologyKind::Tree);
        assert_eq!(segment.flavor.as_deref(), Some("large"));
        assert_eq!(segment.to_string(), "tree:5:large");

        assert!("ring".parse::<SegmentArg>().is_err());
        assert!("mesh:3".parse::<SegmentArg>().is_err());
        assert!("linear:two".parse::<SegmentArg>().is_err());
        assert!("linear:2:tiny:extra".parse::<SegmentArg>().is_err());
    }

    #[test]
    fn test_link_arg_parse() {
        let link = "1-3".parse::<LinkArg>().unwrap();
        assert_eq!(link, LinkArg { a: 1, b: 3 });
        assert_eq!(link.indices(), (0, 2));

        assert!("0-1".parse::<LinkArg>().is_err());
        assert!("1:2".parse::<LinkArg>().is_err());
        assert!("a-b".parse::<LinkArg>().is_err());
    }

    #[test]
    fn test_create_args_parse() {
        let args = SlicecoreArgs::try_parse_from([
            "slicecore",
            "--store",
            "/tmp/slices.yaml",
            "create",
            "--name",
            "lab",
            "--segment",
            "linear:3",
            "--vm",
            "tiny",
            "--link",
            "3-4",
            "--internet",
        ])
        .unwrap();

        assert_eq!(args.store, Some(PathBuf::from("/tmp/slices.yaml")));
        match args.subcommand {
            Some(SlicecoreSubcommand::Create {
                name,
                segments,
                vms,
                links,
                internet,
                ..
            }) => {
                assert_eq!(name, "lab");
                assert_eq!(segments.len(), 1);
                assert_eq!(vms, vec!["tiny"]);
                assert_eq!(links, vec![LinkArg { a: 3, b: 4 }]);
                assert!(internet);
            }
            other => panic!("unexpected subcommand: {:?}", other),
        }
    }

    #[test]
    fn test_images_args_parse() {
        let args = SlicecoreArgs::try_parse_from(["slicecore", "images"]).unwrap();
        assert!(matches!(args.subcommand, Some(SlicecoreSubcommand::Images)));

        let args = SlicecoreArgs::try_parse_from([
            "slicecore",
            "create",
            "--name",
            "lab",
            "--vm",
            "small",
            "--image",
            "ubuntu-22.04-server-cloudimg-amd64.img",
        ])
        .unwrap();
        match args.subcommand {
            Some(SlicecoreSubcommand::Create { image, .. }) => {
                assert_eq!(image.as_deref(), Some("ubuntu-22.04-server-cloudimg-amd64.img"));
            }
            other => panic!("unexpected subcommand: {:?}", other),
        }
    }
}
