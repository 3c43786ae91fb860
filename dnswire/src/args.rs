//! CLI argument definition and parsing.

use std::env;
use std::process;
use std::str::FromStr;
use std::time::Duration;

use dnswire::{QueryMetadata, DEFAULT_PORT, DEFAULT_TIMEOUT};
use dnswire_proto::{Name, RecordType};
use owo_colors::OwoColorize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Args {
    pub nameserver: String,
    pub name: String,
    pub qtype: RecordType,
    pub port: u16,
    pub timeout: Duration,
    pub short: bool,
    pub print_query: bool,
    pub print_meta: bool,
    #[cfg(feature = "json")]
    pub json: bool,
}

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Query(Args),
    Help,
    Version,
    /// Not enough arguments were given to make a query.
    Usage,
}

enum ConsumeNext {
    Port,
    Timeout,
}

const DEFAULT_NAMESERVER: &str = "8.8.8.8";

impl Args {
    /// Parses the process arguments, exiting on `--help`, `--version`, missing arguments (all
    /// with code 0) and invalid arguments (with code 1).
    pub fn parse() -> Self {
        // skip executable name
        match Self::try_parse_from(env::args().skip(1)) {
            Ok(Command::Query(args)) => args,
            Ok(Command::Help) => {
                print_help();
                process::exit(0);
            }
            Ok(Command::Version) => {
                print_version();
                process::exit(0);
            }
            Ok(Command::Usage) => {
                print_usage();
                process::exit(0);
            }
            Err(msg) => err(msg),
        }
    }

    /// Parses the given arguments, which must not include the executable name.
    ///
    /// Returns the message to show the user if an argument is invalid.
    pub fn try_parse_from<I, S>(args: I) -> Result<Command, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut nameserver = DEFAULT_NAMESERVER.to_string();
        let mut positional = Vec::new();
        let mut port = DEFAULT_PORT;
        let mut timeout = DEFAULT_TIMEOUT;
        let mut short = false;
        let mut print_query = true;
        let mut print_meta = true;
        #[cfg(feature = "json")]
        let mut json = false;

        let mut consume_next = None;

        for arg in args {
            let arg: String = arg.into();
            if let Some(to_consume) = &consume_next {
                match to_consume {
                    ConsumeNext::Port => match arg.parse::<u16>() {
                        Ok(val) => port = val,
                        Err(_) => return Err(format!("Invalid port: {}.", arg)),
                    },
                    ConsumeNext::Timeout => match arg.parse::<u64>() {
                        Ok(secs) if secs > 0 => timeout = Duration::from_secs(secs),
                        _ => return Err(format!("Invalid timeout: {}.", arg)),
                    },
                }
                consume_next = None;
            } else if let Some(ns) = arg.strip_prefix('@') {
                // nameserver
                nameserver = ns.to_string();
            } else if let Some(flag) = arg.strip_prefix('+') {
                // flags
                match flag {
                    "short" => {
                        short = true;
                    }
                    "no-query" => {
                        print_query = false;
                    }
                    "no-meta" => {
                        print_meta = false;
                    }
                    #[cfg(feature = "json")]
                    "json" => {
                        json = true;
                    }
                    x => {
                        return Err(format!("Invalid flag: +{}.", x));
                    }
                }
            } else if let Some(option) = arg.strip_prefix('-') {
                // options
                match option {
                    "h" | "-help" => return Ok(Command::Help),
                    "V" | "-version" => return Ok(Command::Version),
                    "p" | "-port" => {
                        consume_next = Some(ConsumeNext::Port);
                    }
                    "t" | "-timeout" => {
                        consume_next = Some(ConsumeNext::Timeout);
                    }
                    x => {
                        return Err(format!("Invalid option: -{}.", x));
                    }
                }
            } else {
                positional.push(arg);
            }
        }

        match consume_next {
            Some(ConsumeNext::Port) => return Err("Missing value for --port.".into()),
            Some(ConsumeNext::Timeout) => return Err("Missing value for --timeout.".into()),
            None => {}
        }

        let (name, qtype) = match positional.as_slice() {
            [] | [_] => return Ok(Command::Usage),
            [name, qtype] => (name.clone(), qtype),
            [_, _, extra, ..] => return Err(format!("Unexpected argument: {}.", extra)),
        };

        let qtype = RecordType::from_str(qtype).map_err(|_| {
            format!(
                "Unknown type '{}'. Use a, aaaa, txt, mx, or any.",
                qtype
            )
        })?;

        if let Err(e) = Name::from_ascii(&name) {
            return Err(format!("Invalid hostname '{}': {}", name, e));
        }

        if nameserver.is_empty() {
            return Err("Invalid nameserver: must not be empty.".into());
        }

        Ok(Command::Query(Self {
            nameserver,
            name,
            qtype,
            port,
            timeout,
            short,
            print_query,
            print_meta,
            #[cfg(feature = "json")]
            json,
        }))
    }
}

impl From<Args> for QueryMetadata {
    fn from(args: Args) -> Self {
        Self {
            name: args.name,
            qtype: args.qtype,
            nameserver: args.nameserver,
            port: args.port,
            timeout: args.timeout,
        }
    }
}

macro_rules! var {
    ($var:expr) => {
        $var.if_supports_color(owo_colors::Stream::Stdout, |s| s.green())
    };
}

macro_rules! printopt {
    ($opt:expr, $desc:expr) => {
        println!(
            "\t    {:<21} ({})",
            $opt.if_supports_color(owo_colors::Stream::Stdout, |s| s.yellow()),
            $desc,
        )
    };
}

macro_rules! printflag {
    ($flag:expr, $desc:expr) => {
        println!(
            "\t    {:<12} ({})",
            $flag.if_supports_color(owo_colors::Stream::Stdout, |s| s.yellow()),
            $desc,
        )
    };
}

fn print_usage() {
    let output = owo_colors::Stream::Stdout;
    print!("{}", "Usage:".if_supports_color(output, |s| s.purple()));
    println!(
        "\tdnswire [@{}] {} {} [{}] [{}]",
        var!("nameserver"),
        var!("hostname"),
        var!("type"),
        var!("options"),
        var!("flags")
    );
}

fn print_help() {
    let output = owo_colors::Stream::Stdout;
    print_usage();
    println!();

    println!("{}", "Where:".if_supports_color(output, |s| s.purple()));

    println!(
        "\t{} is the IP address or hostname of a DNS nameserver (default: {})",
        var!("nameserver"),
        DEFAULT_NAMESERVER
    );
    println!();

    println!("\t{} is the domain you want to query", var!("hostname"));
    println!();

    println!(
        "\t{} is the record type you want: a, aaaa, txt, mx or any",
        var!("type")
    );
    println!();

    println!("\t{} is one or more of the following:", var!("options"));
    printopt!("-h | --help", "print this help message");
    printopt!("-V | --version", "print the version of dnswire");
    printopt!("-p | --port <port>", "use the given port number");
    printopt!(
        "-t | --timeout <secs>",
        "wait this long for a reply; default 10"
    );
    println!();
    println!("\t{} is one or more of the following:", var!("flags"));
    printflag!("+short", "print one line per record instead of every field");
    printflag!("+no-query", "don't print the query that is sent");
    printflag!(
        "+no-meta",
        "don't print query metadata, e.g. server and time"
    );
    #[cfg(feature = "json")]
    printflag!("+json", "format the reply as JSON");
    println!();

    println!("Note: apart from hostname and type, the order of the arguments does not matter.");
    println!();

    println!(
        "Log output is controlled by the {} environment variable. Output is colourized by\ndefault. This can be tuned using the {}/{} environment variables.",
        var!("RUST_LOG"),
        var!("FORCE_COLOR"),
        var!("NO_COLOR")
    );
}

fn print_version() {
    println!("dnswire v{}", env!("CARGO_PKG_VERSION"));
}

fn err(msg: impl AsRef<str>) -> ! {
    eprintln!("{}", msg.as_ref());
    process::exit(1)
}
