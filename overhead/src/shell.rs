//! Small console shell on top of the control surface.
//!
//! One command per line:
//!
//! - `pause`, `resume`, `toggle`
//! - `radius <km>`
//! - `recent`
//! - `open <n|callsign>`
//! - `status`
//! - `help`
//! - `quit` or `exit`
//!

use std::io::{BufRead, Write};

use tracing::{debug, trace, warn};

use crate::{Action, ControlSurface, Reply, Status, RADII};

/// Parsed command line
///
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Goes to the control surface
    Do(Action),
    /// `open` with an index into the recent list, 1-based
    OpenNth(usize),
    Recent,
    Status,
    Help,
    /// Empty line
    Nothing,
}

impl Command {
    /// Parse one line
    ///
    pub fn parse(line: &str) -> Result<Command, Status> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Ok(Command::Nothing);
        };
        let arg = words.next();

        let need = |what: &str| arg.ok_or_else(|| Status::MissingArgument(what.to_string()));

        let cmd = match cmd.to_lowercase().as_str() {
            "pause" => Command::Do(Action::SetPaused(true)),
            "resume" => Command::Do(Action::SetPaused(false)),
            "toggle" => Command::Do(Action::TogglePause),
            "radius" => {
                let arg = need("radius")?;
                let km = arg
                    .trim_end_matches("km")
                    .parse::<f64>()
                    .map_err(|_| Status::BadArgument(arg.to_string()))?;
                Command::Do(Action::SetRadius(km))
            }
            "open" => {
                let arg = need("open")?;
                match arg.parse::<usize>() {
                    Ok(n) => Command::OpenNth(n),
                    Err(_) => Command::Do(Action::OpenLink(arg.to_string())),
                }
            }
            "recent" => Command::Recent,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Do(Action::Exit),
            _ => return Err(Status::UnknownCommand(cmd.to_string())),
        };
        Ok(cmd)
    }
}

/// Status line and radius menu, the current radius is marked.
///
pub fn render_status(control: &ControlSurface) -> String {
    let cfg = control.config();

    let state = if cfg.paused { "Paused" } else { "Monitoring" };
    let menu: Vec<String> = RADII
        .iter()
        .map(|r| {
            if *r == cfg.radius_km {
                format!("[{r} km]")
            } else {
                format!("{r} km")
            }
        })
        .collect();

    format!(
        "{state}: {} aircraft within {} km, {} requests\nRadius: {}\n",
        control.current_aircraft(),
        cfg.radius_km,
        control.requests(),
        menu.join(" ")
    )
}

/// Recent sightings, numbered from 1, oldest first
///
pub fn render_recent(control: &ControlSurface) -> String {
    let feed = control.recent_sightings();
    if feed.is_empty() {
        return "No recent sightings\n".to_string();
    }

    feed.iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>2}. {}\n", i + 1, entry.display))
        .collect()
}

pub fn render_help() -> String {
    r##"Commands:
  pause | resume | toggle   stop or restart polling
  radius <km>               change the watched radius
  recent                    list recent sightings
  open <n|callsign>         show the link for a sighting
  status                    current state
  help                      this text
  quit | exit               stop everything
"##
    .to_string()
}

/// Run one command, return what to print and whether we should stop.
///
#[tracing::instrument(skip(control))]
pub fn execute(control: &ControlSurface, cmd: Command) -> Result<(String, bool), Status> {
    trace!("execute");

    let out = match cmd {
        Command::Nothing => (String::new(), false),
        Command::Recent => (render_recent(control), false),
        Command::Status => (render_status(control), false),
        Command::Help => (render_help(), false),
        Command::OpenNth(n) => {
            let feed = control.recent_sightings();
            let entry = n
                .checked_sub(1)
                .and_then(|i| feed.get(i))
                .ok_or_else(|| Status::NoSuchSighting(n.to_string()))?;
            (format!("View: {}\n", entry.link), false)
        }
        Command::Do(action) => match control.dispatch(action)? {
            Reply::Radius(km) => (format!("Radius is now {km} km\n"), false),
            Reply::Paused(true) => ("Paused\n".to_string(), false),
            Reply::Paused(false) => ("Monitoring\n".to_string(), false),
            Reply::Link(link) => (format!("View: {link}\n"), false),
            Reply::Exit => (String::new(), true),
        },
    };
    Ok(out)
}

/// Read commands from `input` until `quit` or end of input, output goes to `out`.
///
/// Returns `true` if the user asked us to stop.
///
pub fn run_shell<R, W>(control: &ControlSurface, input: R, out: &mut W) -> eyre::Result<bool>
where
    R: BufRead,
    W: Write,
{
    trace!("run_shell");

    write!(out, "{}", render_status(control))?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        debug!("shell: {line}");

        let res = Command::parse(&line).and_then(|cmd| execute(control, cmd));
        match res {
            Ok((text, stop)) => {
                write!(out, "{text}")?;
                if stop {
                    out.flush()?;
                    return Ok(true);
                }
            }
            Err(e) => {
                warn!("{e}");
                writeln!(out, "{e}, try `help`")?;
            }
        }
        out.flush()?;
    }
    Ok(false)
}
