use std::time::Duration;

use anyhow::{Context, Result};
use dnswire::net::Nameserver;
use dnswire::util::{parse_reply, prepare_query, reply_matches, send_query};
use dnswire::QueryMetadata;
use dnswire_proto::{decode, Message, ResponseCode};
use log::{debug, warn};
use owo_colors::{OwoColorize, Style};

mod args;

use args::Args;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let query_metadata: QueryMetadata = args.clone().into();
    let data = prepare_query(&query_metadata)?;
    let query = decode(&data).context("Could not decode the query that was built.")?;
    debug!("built query: {}", query.header);
    let mut nameserver = Nameserver::from_metadata(&query_metadata);

    if args.print_query && !args.short && !json_output(&args) {
        println!("Sent {} bytes.", data.len());
        println!("{}", query.as_string(Some(owo_colors::Stream::Stdout)));
        println!();
    }

    let (answer, bytes_recvd, elapsed) = send_query(&query_metadata, &mut nameserver, &data)?;

    let res = parse_reply(&answer)?;
    if !reply_matches(&query, &res) {
        warn!(
            "reply ID {} does not match query ID {}",
            res.header.id, query.header.id
        );
        eprintln!(
            "{}",
            format!(
                "Warning: the reply ID ({}) does not match the query ID ({}).",
                res.header.id, query.header.id
            )
            .if_supports_color(owo_colors::Stream::Stderr, |s| s.yellow())
        );
    }

    display_result(&res, &args, &nameserver, bytes_recvd, &elapsed)
}

#[cfg(feature = "json")]
fn json_output(args: &Args) -> bool {
    args.json
}

#[cfg(not(feature = "json"))]
fn json_output(_args: &Args) -> bool {
    false
}

fn display_result(
    res: &Message,
    args: &Args,
    nameserver: &Nameserver,
    bytes_recvd: usize,
    elapsed: &Duration,
) -> Result<()> {
    let output = owo_colors::Stream::Stdout;

    #[cfg(feature = "json")]
    if args.json {
        let json = serde_json::to_string_pretty(res).context("Could not serialize the reply.")?;
        println!("{}", json);
        return Ok(());
    }

    if args.short {
        match res.records_string(Some(output)) {
            Some(records) => println!("{}", records),
            None if res.is_error_response() => {}
            None => println!("<empty response>"),
        }

        if args.print_meta || res.is_error_response() {
            let rcode = res.header.response_code;
            let style = if rcode == ResponseCode::Success {
                Style::new().green()
            } else {
                Style::new().red()
            };

            println!();
            println!(
                "{} from {} in {} ms",
                rcode
                    .description()
                    .if_supports_color(output, |s| s.style(style)),
                nameserver,
                elapsed.as_millis()
            );
        }
        return Ok(());
    }

    println!("Received {} bytes.", bytes_recvd);
    println!("{}", res.as_string(Some(output)));

    if args.print_meta {
        println!();
        println!(
            "{}",
            "Query metadata:".if_supports_color(output, |s| s.yellow())
        );
        println!("\tTime:        {} ms", elapsed.as_millis());
        println!("\tReply size:  {} bytes", bytes_recvd);
        println!("\tServer:      {}", nameserver);
    }

    Ok(())
}
