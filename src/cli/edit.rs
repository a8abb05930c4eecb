use super::CliSettings;
use crate::registry::model::Capabilities;
use crate::registry::staging::{ModelRow, ModelRowArena, RowKey};
use crate::settings::{NewProvider, SettingsError};
use crate::{AddArgs, BindArgs, CatalogArgs, ConnectorArgs, OverrideAction, ProviderArgs};

/// Reports a failed mutation the way settings recorded it.
fn die_with(settings: &CliSettings, action: &str, err: SettingsError) -> ! {
    let reason = settings
        .last_error()
        .map(|e| e.to_string())
        .unwrap_or_else(|| err.to_string());

    crate::die!("failed to {}: {}", action, reason)
}

pub(crate) fn add_cmd(settings: &mut CliSettings, args: &AddArgs) {
    let new = NewProvider {
        id: args.id.clone(),
        name: args.name.clone(),
        template: args.template.clone(),
        class: args.class,
        key: args.key.clone(),
    };

    match settings.add_provider(new) {
        Ok(provider) => println!("added provider \"{}\"", provider.id),
        Err(err) => die_with(settings, "add provider", err),
    }
}

pub(crate) fn remove_cmd(settings: &mut CliSettings, args: &ProviderArgs) {
    let released = match settings.remove_provider(&args.id) {
        Ok(released) => released,
        Err(err) => die_with(settings, "remove provider", err),
    };

    println!("removed provider \"{}\"", args.id);

    for consumer in released {
        crate::warn!("{} no longer has an active provider", consumer);
    }
}

/// Parses `KEY=VALUE`.
fn parse_pair(pair: &str) -> Option<(String, String)> {
    let (from, to) = pair.split_once('=')?;
    let (from, to) = (from.trim(), to.trim());

    if from.is_empty() || to.is_empty() {
        return None;
    }

    Some((from.to_string(), to.to_string()))
}

pub(crate) fn connector_cmd(settings: &mut CliSettings, args: &ConnectorArgs) {
    let mut provider = match settings.provider(&args.provider) {
        Ok(provider) => provider,
        Err(err) => crate::die!("{}", err),
    };

    if args.remove {
        if provider.connectors.remove(&args.consumer).is_none() {
            crate::warn!(
                "\"{}\" has no {} connector, nothing to remove",
                provider.id,
                args.consumer
            );
            return;
        }
    } else {
        let connector = provider.connectors.entry(args.consumer).or_default();

        if let Some(base_url) = &args.base_url {
            connector.base_url = Some(base_url.trim().to_string()).filter(|u| !u.is_empty());
        }

        if let Some(wire_api) = args.wire_api {
            connector.wire_api = wire_api;
        }

        if let Some(key) = &args.key {
            connector.env_key_or_token = Some(key.clone());
        }

        for alias in &args.aliases {
            match parse_pair(alias) {
                Some((from, to)) => {
                    connector.model_aliases.insert(from, to);
                }
                None => crate::die!("invalid alias \"{}\", expected FROM=TO", alias),
            }
        }

        if args.key.is_some() && provider.env_key_or_token.is_some() {
            crate::warn!(
                "\"{}\" has a provider-level credential, which takes precedence over the connector's",
                provider.id
            );
        }
    }

    match settings.update_provider(provider) {
        Ok(provider) => println!("updated {} connector of \"{}\"", args.consumer, provider.id),
        Err(err) => die_with(settings, "update provider", err),
    }
}

fn parse_capabilities(flags: &str) -> Option<Capabilities> {
    let mut capabilities = Capabilities::default();

    for flag in flags.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        match flag {
            "reasoning" => capabilities.reasoning = true,
            "tool-use" | "tools" => capabilities.tool_use = true,
            "vision" => capabilities.vision = true,
            "long-context" => capabilities.long_context = true,
            _ => return None,
        }
    }

    Some(capabilities)
}

fn find_row(rows: &ModelRowArena, model_id: &str) -> Option<RowKey> {
    rows.rows()
        .find(|(_, row)| row.model_id == model_id)
        .map(|(key, _)| key)
}

pub(crate) fn catalog_cmd(settings: &mut CliSettings, args: &CatalogArgs) {
    let mut rows = match settings.stage_catalog(&args.provider) {
        Ok(rows) => rows,
        Err(err) => crate::die!("{}", err),
    };

    for model_id in &args.remove {
        match find_row(&rows, model_id) {
            Some(key) => {
                rows.remove(key);
            }
            None => crate::warn!("\"{}\" is not in the catalog", model_id),
        }
    }

    for rename in &args.rename {
        let (from, to) = match parse_pair(rename) {
            Some(pair) => pair,
            None => crate::die!("invalid rename \"{}\", expected FROM=TO", rename),
        };

        match find_row(&rows, &from).and_then(|key| rows.get_mut(key)) {
            Some(row) => row.model_id = to,
            None => crate::warn!("\"{}\" is not in the catalog", from),
        }
    }

    for model_id in &args.add {
        if rows.materialize().contains(model_id.trim()) {
            crate::warn!("\"{}\" is already in the catalog", model_id);
            continue;
        }

        rows.push(ModelRow {
            model_id: model_id.clone(),
            ..ModelRow::default()
        });
    }

    for entry in &args.capabilities {
        let (model_id, capabilities) = match parse_pair(entry)
            .and_then(|(model, flags)| Some((model, parse_capabilities(&flags)?)))
        {
            Some(parsed) => parsed,
            None => crate::die!(
                "invalid capabilities \"{}\", expected MODEL=reasoning,tool-use,vision,long-context",
                entry
            ),
        };

        match find_row(&rows, &model_id).and_then(|key| rows.get_mut(key)) {
            Some(row) => row.capabilities = capabilities,
            None => crate::warn!("\"{}\" is not in the catalog", model_id),
        }
    }

    let staged = rows.len();

    match settings.save_catalog(&args.provider, &rows) {
        Ok(provider) if rows.is_empty() => println!("\"{}\" has an empty catalog", provider.id),
        Ok(provider) => println!(
            "\"{}\" offers {} of {} staged models: {}",
            provider.id,
            provider.model_ids().len(),
            staged,
            provider.model_ids().join(", ")
        ),
        Err(err) => die_with(settings, "save catalog", err),
    }
}

pub(crate) fn bind_cmd(settings: &mut CliSettings, args: &BindArgs) {
    // An unknown id would normalize to no provider and silently unbind.
    if let Some(provider) = &args.provider {
        if let Err(err) = settings.provider(provider) {
            crate::die!("{}", err);
        }
    }

    let state = match settings.select(args.consumer, args.provider.as_deref(), args.model.as_deref()) {
        Ok(state) => state,
        Err(err) => crate::die!("failed to bind {}: {}", args.consumer, err),
    };

    let (provider, model) = match state {
        Some(state) => (state.provider_id(), state.model_id()),
        None => (None, None),
    };

    if let Some(requested) = &args.model {
        if model != Some(requested.as_str()) {
            crate::warn!(
                "\"{}\" is not offered by \"{}\"",
                requested,
                provider.unwrap_or("-")
            );
        }
    }

    match (provider, model) {
        (Some(provider), Some(model)) => println!("{} -> {}/{}", args.consumer, provider, model),
        (Some(provider), None) => println!("{} -> {} (no model)", args.consumer, provider),
        _ => println!("{} is unbound", args.consumer),
    }
}

pub(crate) fn override_cmd(settings: &mut CliSettings, action: &OverrideAction) {
    match action {
        OverrideAction::Set {
            consumer,
            provider,
            models,
        } => {
            if let Err(err) = settings.set_override(*consumer, provider, models.clone()) {
                die_with(settings, "set override", err);
            }

            println!("{} now sees {} models from \"{}\"", consumer, models.len(), provider);
        }
        OverrideAction::Clear { consumer, provider } => {
            match settings.clear_override(*consumer, provider) {
                Ok(true) => println!("{} sees the full catalog of \"{}\"", consumer, provider),
                Ok(false) => crate::warn!("{} has no override for \"{}\"", consumer, provider),
                Err(err) => die_with(settings, "clear override", err),
            }
        }
    }
}
