// lsrctl: client de contrôle interactif pour interroger un démon en cours
// d'exécution (spec.md §6.5, ambient tooling — ne conditionne aucun
// comportement du coeur du protocole).

use std::io::{self, Write};
use std::net::UdpSocket;

use lsrouted::control::ControlRequest;

fn help() {
    println!("Available commands:");
    println!("  routing-table  - show the current routing table");
    println!("  neighbors      - show detected/recognized neighbors");
    println!("  help           - show this message");
    println!("  exit           - quit lsrctl");
}

fn main() -> io::Result<()> {
    print!("Router address [127.0.0.1]: ");
    io::stdout().flush()?;
    let mut host = String::new();
    io::stdin().read_line(&mut host)?;
    let host = host.trim();
    let host = if host.is_empty() { "127.0.0.1" } else { host };

    print!("Router port [5000]: ");
    io::stdout().flush()?;
    let mut port = String::new();
    io::stdin().read_line(&mut port)?;
    let port: u16 = port.trim().parse().unwrap_or(5000);

    let socket = UdpSocket::bind("0.0.0.0:0")?;
    let server_addr = format!("{host}:{port}");
    socket.set_read_timeout(Some(std::time::Duration::from_secs(3)))?;

    println!("lsrctl connected to {server_addr}");
    help();

    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let command = input.trim();

        if command.is_empty() {
            continue;
        }
        if command == "exit" {
            break;
        }
        if command == "help" {
            help();
            continue;
        }

        let request = ControlRequest {
            command: command.to_string(),
        };
        let serialized = serde_json::to_vec(&request).expect("control request always serializes");
        if let Err(e) = socket.send_to(&serialized, &server_addr) {
            println!("send failed: {e}");
            continue;
        }

        let mut buf = [0u8; 4096];
        match socket.recv_from(&mut buf) {
            Ok((len, _)) => println!("{}", String::from_utf8_lossy(&buf[..len])),
            Err(e) => println!("no response ({e})"),
        }
    }

    Ok(())
}
