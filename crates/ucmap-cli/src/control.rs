//! Line-oriented control language for `ucmap-cli interactive`.
//!
//! ```text
//! network <name> on|off     toggle one network checkbox
//! networks all              re-check every network
//! state <UF>|Todos          state selector
//! cnpj [text]               tax-ID substring (blank clears)
//! name [text]               name substring (blank clears)
//! sort nome_az|nome_za|rede_az|rede_za
//! clusters on|off
//! clear                     reset every filter
//! show                      print the current view
//! quit
//! ```

use anyhow::{anyhow, bail, Context};

use crate::session::Control;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Control(Control),
    Show,
    Quit,
}

/// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
///
/// # Errors
///
/// Returns an error describing the expected syntax when the line is not a
/// recognised command.
pub fn parse_line(line: &str) -> anyhow::Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(c, r)| (c, r.trim()));

    let input = match command.to_lowercase().as_str() {
        "network" | "rede" => {
            let (name, toggle) = rest
                .rsplit_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: network <name> on|off"))?;
            let name = name.trim();
            if name.is_empty() {
                bail!("usage: network <name> on|off");
            }
            Input::Control(Control::SetNetwork {
                name: name.to_string(),
                checked: parse_toggle(toggle)?,
            })
        }
        "networks" | "redes" => match rest {
            "all" | "todas" => Input::Control(Control::SelectAllNetworks),
            _ => bail!("usage: networks all"),
        },
        "state" | "estado" => {
            if rest.is_empty() {
                bail!("usage: state <UF>|Todos");
            }
            Input::Control(Control::SetState(rest.to_string()))
        }
        "cnpj" => Input::Control(Control::SetTaxId(rest.to_string())),
        "name" | "nome" => Input::Control(Control::SetName(rest.to_string())),
        "sort" | "ordem" => Input::Control(Control::SetSort(
            rest.parse()
                .with_context(|| "usage: sort nome_az|nome_za|rede_az|rede_za")?,
        )),
        "clusters" | "cluster" => Input::Control(Control::SetClustering(parse_toggle(rest)?)),
        "clear" | "limpar" => Input::Control(Control::ClearFilters),
        "show" => Input::Show,
        "quit" | "exit" => Input::Quit,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(input))
}

fn parse_toggle(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "on" | "true" | "1" | "sim" => Ok(true),
        "off" | "false" | "0" | "nao" | "não" => Ok(false),
        other => bail!("expected on|off, got '{other}'"),
    }
}
