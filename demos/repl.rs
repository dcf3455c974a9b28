//! Interactive console on stdin.
//!
//! ```text
//! cargo run --example repl [config.toml]
//! ```
//!
//! Lines are run as console input. A line starting with `?` asks for the next
//! autofill candidate of the rest of the line instead. Set `RUST_LOG=debug` to
//! see resolution traces.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use devcon::{CommandProperties, CommandSet, Console, ConsoleConfig, Severity};
use tracing_subscriber::EnvFilter;

struct Ship {
    hull: i64,
    speed: f64,
}

fn demo_commands(ship_count: &Rc<RefCell<i64>>) -> CommandSet {
    let mut set = CommandSet::new("demo");
    set.method(
        CommandProperties::new("add").description("Add two numbers"),
        |a: i64, b: i64| a + b,
    )
    .method(CommandProperties::new("add"), |a: f64, b: f64| a + b)
    .method(
        CommandProperties::new("shout").description("Upper-case some text"),
        |text: String| text.to_uppercase(),
    )
    .field(
        CommandProperties::new("fleet_size").description("Ships in the fleet"),
        ship_count,
    )
    .instance_method(
        CommandProperties::new("repair").description("Repair a ship").cheat(),
        |ship: &mut Ship, amount: i64| {
            ship.hull = (ship.hull + amount).min(100);
            ship.hull
        },
    )
    .instance_field(
        CommandProperties::new("speed").description("Ship speed"),
        |ship: &Ship| ship.speed,
        |ship: &mut Ship, speed: f64| ship.speed = speed,
    );
    set
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ConsoleConfig::load_or_default(path),
        None => ConsoleConfig::default(),
    };

    let mut console = Console::with_builtins(config);
    console.subscribe(|line| {
        let prefix = match line.severity {
            Severity::Input => "",
            Severity::Info => "  ",
            Severity::Warning => "! ",
            Severity::Error => "x ",
        };
        println!("{prefix}{}", line.message);
    });

    let fleet = Rc::new(RefCell::new(2i64));
    console.install(&demo_commands(&fleet));

    let ships = [
        Rc::new(RefCell::new(Ship { hull: 40, speed: 1.0 })),
        Rc::new(RefCell::new(Ship { hull: 75, speed: 2.5 })),
    ];
    console.instances().register("Endeavour", &ships[0]);
    console.instances().register("Enterprise", &ships[1]);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print!("> ");
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if let Some(partial) = line.strip_prefix('?') {
            match console.autofill_next(partial) {
                Some(completed) => println!("  {completed}"),
                None => println!("  (no suggestion)"),
            }
        } else {
            console.run_input(&line);
        }
        print!("> ");
        stdout.flush()?;
    }
    Ok(())
}
