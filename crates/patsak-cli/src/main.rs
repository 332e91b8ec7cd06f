//! A REPL for exercising the compiler pipeline (parse -> translate -> run)
//! against a single live Postgres connection, for manual debugging. Not the
//! request dispatcher: this talks to exactly one connection at a time and
//! reads one line of QL source per iteration.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use patsak::{Config, Runtime};

#[tokio::main]
async fn main() -> Result<()> {
    Runtime::init_tracing();

    let config = Config::from_env();
    tracing::info!(schema = %config.schema, "starting patsak-cli");
    let mut runtime = Runtime::connect(&config).await?;

    println!("patsak-cli — enter a QL relation expression, or `:quit` to exit");
    let stdin = io::stdin();
    loop {
        print!("ql> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }

        match runtime.catalog().query(line, &[], &[], &[], 0, None).await {
            Ok((rows, header)) => print_rows(&header, &rows),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    runtime.db().rollback().await.ok();
    Ok(())
}

fn print_rows(header: &patsak_types::Header, rows: &[Vec<patsak_types::Value>]) {
    let names: Vec<&str> = header.names().collect();
    println!("{}", names.join(" | "));
    for row in rows {
        let rendered: Vec<String> = row.iter().map(render_value).collect();
        println!("{}", rendered.join(" | "));
    }
    println!("({} row{})", rows.len(), if rows.len() == 1 { "" } else { "s" });
}

fn render_value(v: &patsak_types::Value) -> String {
    use patsak_types::Type;
    match v.get_type() {
        Type::Boolean => v.as_bool().to_string(),
        Type::Number | Type::Integer | Type::Serial => v.as_double().to_string(),
        Type::String | Type::Json => v.as_str().to_string(),
        Type::Binary => format!("{:?}", v.as_bytes()),
        Type::Date => format!("{:?}", v.as_date()),
    }
}
