//! Interactive explorer client.
//!
//! Connects to a tool server running in TCP mode (`bitscrape-mcp --tcp ADDR`)
//! and drives the four tools from a small menu. Plain blocking I/O; one
//! request is always in flight at a time.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::{Value, json};

#[derive(Parser)]
#[command(
    name = "bitscrape-explore",
    about = "Interactive explorer for a running component tool server",
    version
)]
struct Cli {
    /// Address of a tool server in TCP mode.
    #[arg(default_value = "127.0.0.1:3000")]
    addr: String,
}

struct Client {
    writer: TcpStream,
    reader: BufReader<TcpStream>,
    next_id: u64,
}

impl Client {
    fn connect(addr: &str) -> Result<Self> {
        let stream =
            TcpStream::connect(addr).with_context(|| format!("could not connect to {addr}"))?;
        let reader = BufReader::new(stream.try_clone().context("stream clone failed")?);
        Ok(Self {
            writer: stream,
            reader,
            next_id: 1,
        })
    }

    fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        writeln!(self.writer, "{request}").context("send failed")?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).context("read failed")? == 0 {
            bail!("server closed the connection");
        }

        let response: Value = serde_json::from_str(line.trim()).context("unparseable response")?;
        if let Some(error) = response.get("error")
            && !error.is_null()
        {
            bail!(
                "server error {}: {}",
                error["code"],
                error["message"].as_str().unwrap_or("unknown")
            );
        }
        Ok(response["result"].clone())
    }

    /// Call one tool and return its text content.
    fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String> {
        let result = self.request(
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
        )?;
        let text = result["content"][0]["text"]
            .as_str()
            .context("tool returned no text content")?;
        Ok(text.to_string())
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut client = Client::connect(&cli.addr)?;
    client.request("initialize", json!({}))?;

    println!("Connected to component tool server at {}", cli.addr);
    println!("---------------------------------");
    match client.call_tool("listCategories", json!({})) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Failed to list categories: {e}"),
    }

    loop {
        println!("\nComponent Explorer");
        println!("1. List all components");
        println!("2. List components by category");
        println!("3. Search components");
        println!("4. Get component details");
        println!("5. Exit");

        match prompt("\nSelect an option: ")?.as_str() {
            "1" => show(client.call_tool("listComponents", json!({}))),
            "2" => {
                let category = prompt("Enter category name: ")?;
                show(client.call_tool("listComponents", json!({ "category": category })));
            }
            "3" => {
                let query = prompt("Enter search query: ")?;
                let category =
                    prompt("Filter by category? (Press Enter to skip or enter category name): ")?;
                let mut arguments = json!({ "query": query });
                if !category.is_empty() {
                    arguments["category"] = Value::String(category);
                }
                show(client.call_tool("searchComponents", arguments));
            }
            "4" => {
                let name = prompt("Enter component name: ")?;
                show(client.call_tool("getComponent", json!({ "name": name })));
            }
            "5" => {
                println!("Exiting...");
                break;
            }
            _ => println!("Invalid option"),
        }
    }

    Ok(())
}

fn show(result: Result<String>) {
    match result {
        Ok(text) => println!("\n{text}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
