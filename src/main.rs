//! ipfields CLI entry point.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ipfields::sql::{dialect_by_name, Expr, Predicate, SqlDialect};
use ipfields::types::{parse_address, parse_network};
use ipfields::{
    decode_address, decode_network, encode_address, encode_network, FieldOptions, IpAddressField,
    IpField, IpNetworkField, Operand,
};

/// Encode, decode and query IP values stored as prefix-searchable strings.
#[derive(Parser, Debug)]
#[command(name = "ipfields")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored representation of an address or network
    Encode {
        /// Address (10.0.0.1) or network (10.0.0.0/8)
        value: String,
    },

    /// Print the value held by a stored representation
    Decode {
        /// Stored representation, e.g. 400001010
        repr: String,

        /// Decode as a network instead of an address
        #[arg(long)]
        network: bool,
    },

    /// Print the SQL predicate for a lookup
    Lookup {
        /// subnets, supernets or isprivate
        kind: String,

        /// Column holding stored representations (column or table.column)
        column: String,

        /// Operand; true/false for isprivate
        value: String,

        /// SQL dialect
        #[arg(long, default_value = "sqlite")]
        dialect: String,

        /// Field kind owning the column
        #[arg(long, value_enum, default_value = "network")]
        field: FieldKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FieldKind {
    /// Single addresses
    Address,
    /// CIDR networks
    Network,
}

fn encode(value: &str) -> Result<String> {
    if let Ok(addr) = parse_address(value, None) {
        return Ok(encode_address(&addr));
    }
    match parse_network(value, None) {
        Ok(net) => Ok(encode_network(&net)),
        Err(e) => bail!("{}", e),
    }
}

fn parse_operand(kind: &str, value: &str) -> Result<Operand> {
    if kind == "isprivate" {
        let flag: bool = value
            .parse()
            .with_context(|| format!("isprivate expects true or false, got '{}'", value))?;
        return Ok(Operand::Bool(flag));
    }
    Ok(Operand::from(value))
}

fn lookup(kind: &str, column: &str, value: &str, dialect: &dyn SqlDialect, field: FieldKind) -> Result<Predicate> {
    let lhs = Expr::column(column);
    let rhs = Expr::Value(parse_operand(kind, value)?);

    let predicate = match field {
        FieldKind::Address => IpAddressField::new(FieldOptions::default())?.lookup(kind, dialect, &lhs, &rhs)?,
        FieldKind::Network => IpNetworkField::new(FieldOptions::default())?.lookup(kind, dialect, &lhs, &rhs)?,
    };
    Ok(predicate)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Encode { value } => {
            println!("{}", encode(&value)?);
        }
        Command::Decode { repr, network } => {
            if network {
                let net = decode_network(&repr).with_context(|| format!("Failed to decode '{}'", repr))?;
                println!("{}", net);
            } else {
                let addr = decode_address(&repr).with_context(|| format!("Failed to decode '{}'", repr))?;
                println!("{}", addr);
            }
        }
        Command::Lookup { kind, column, value, dialect, field } => {
            let dialect = dialect_by_name(&dialect)
                .with_context(|| format!("Unknown dialect '{}'", dialect))?;
            info!(dialect = dialect.name(), %kind, "building lookup");
            let predicate = lookup(&kind, &column, &value, dialect.as_ref(), field)?;
            println!("{}", predicate.sql);
            for param in &predicate.params {
                println!("{}", param);
            }
        }
    }

    Ok(())
}
