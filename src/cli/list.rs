use strum::IntoEnumIterator;
use table::{Column, IntoTable, Table};
pub(crate) mod table;

use super::CliSettings;
use crate::registry::templates::TEMPLATES;
use crate::registry::{Consumer, ProviderClass};
use crate::{ListingFormat, ModelsArgs, ProviderArgs};

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderRow {
    id: String,
    name: Option<String>,
    class: ProviderClass,
    connectors: Vec<Consumer>,
    models: usize,
    bound_to: Vec<Consumer>,
}

impl From<Vec<ProviderRow>> for Table {
    fn from(value: Vec<ProviderRow>) -> Self {
        let mut tab = Table::new(vec![
            Column::left("ID"),
            Column::left("NAME"),
            Column::left("CLASS"),
            Column::left("CONNECTORS"),
            Column::right("MODELS"),
            Column::left("BOUND"),
        ]);

        for provider in value {
            tab.add_row(vec![
                provider.id,
                provider.name.unwrap_or_default(),
                provider.class.to_string(),
                join(&provider.connectors),
                provider.models.to_string(),
                join(&provider.bound_to),
            ]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateRow {
    id: &'static str,
    name: &'static str,
    class: ProviderClass,
    env_key: &'static str,
    models: Vec<&'static str>,
}

impl From<Vec<TemplateRow>> for Table {
    fn from(value: Vec<TemplateRow>) -> Self {
        let mut tab = Table::new(vec![
            Column::left("TEMPLATE"),
            Column::left("NAME"),
            Column::left("CLASS"),
            Column::left("KEY"),
            Column::left("MODELS"),
        ]);

        for template in value {
            tab.add_row(vec![
                template.id.to_string(),
                template.name.to_string(),
                template.class.to_string(),
                template.env_key.to_string(),
                join(&template.models),
            ]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct BindingRow {
    consumer: Consumer,
    provider: Option<String>,
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl From<Vec<BindingRow>> for Table {
    fn from(value: Vec<BindingRow>) -> Self {
        let mut tab = Table::new(vec![
            Column::left("CONSUMER"),
            Column::left("PROVIDER"),
            Column::left("MODEL"),
            Column::left("NOTE"),
        ]);

        for binding in value {
            tab.add_row(vec![
                binding.consumer.to_string(),
                binding.provider.unwrap_or_default(),
                binding.model.unwrap_or_default(),
                binding.hint.unwrap_or_default(),
            ]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelRow {
    model_id: String,
    sent_as: String,
    recommended: bool,
    selected: bool,
}

impl From<Vec<ModelRow>> for Table {
    fn from(value: Vec<ModelRow>) -> Self {
        let mut tab = Table::new(vec![
            Column::left("MODEL"),
            Column::left("SENT_AS"),
            Column::left("RECOMMENDED"),
            Column::left("SELECTED"),
        ]);

        let mark = |set: bool| (if set { "*" } else { "" }).to_string();

        for model in value {
            tab.add_row(vec![
                model.model_id,
                model.sent_as,
                mark(model.recommended),
                mark(model.selected),
            ]);
        }

        tab
    }
}

pub(crate) fn format_output<O: IntoTable + serde::Serialize>(object: O, format: ListingFormat) {
    match format {
        ListingFormat::Json => match serde_json::to_string_pretty(&object) {
            Ok(output) => println!("{}", output),
            Err(err) => crate::die!("failed to serialize output: {}", err),
        },
        ListingFormat::Table => {
            let tab = object.into_table();

            print!("{}", tab);
        }
        ListingFormat::HeaderlessTable => {
            let mut tab = object.into_table();

            tab.print_header(false);

            print!("{}", tab);
        }
    }
}

pub(crate) fn providers_cmd(settings: &CliSettings, format: ListingFormat) {
    let rows: Vec<ProviderRow> = settings
        .providers()
        .into_iter()
        .map(|provider| ProviderRow {
            bound_to: Consumer::iter()
                .filter(|c| {
                    settings.selection(*c).and_then(|s| s.provider_id())
                        == Some(provider.id.as_str())
                })
                .collect(),
            models: provider.model_ids().len(),
            connectors: provider.connectors.keys().copied().collect(),
            class: provider.class,
            name: provider.name,
            id: provider.id,
        })
        .collect();

    format_output(rows, format);
}

pub(crate) fn show_cmd(settings: &CliSettings, args: &ProviderArgs) {
    let provider = match settings.provider(&args.id) {
        Ok(provider) => provider,
        Err(err) => crate::die!("{}", err),
    };

    match serde_json::to_string_pretty(&provider) {
        Ok(output) => println!("{}", output),
        Err(err) => crate::die!("failed to serialize provider: {}", err),
    }
}

pub(crate) fn templates_cmd(format: ListingFormat) {
    let rows: Vec<TemplateRow> = TEMPLATES
        .iter()
        .map(|t| TemplateRow {
            id: t.id,
            name: t.name,
            class: t.class,
            env_key: t.env_key,
            models: t.models.iter().map(|(id, _)| *id).collect(),
        })
        .collect();

    format_output(rows, format);
}

pub(crate) fn bindings_cmd(settings: &CliSettings, format: ListingFormat) {
    let rows: Vec<BindingRow> = Consumer::iter()
        .filter_map(|consumer| settings.selection(consumer))
        .map(|state| BindingRow {
            consumer: state.consumer(),
            provider: state.provider_id().map(|s| s.to_string()),
            model: state.model_id().map(|s| s.to_string()),
            hint: state.hint().map(|s| s.to_string()),
        })
        .collect();

    format_output(rows, format);
}

pub(crate) fn models_cmd(settings: &CliSettings, args: &ModelsArgs, format: ListingFormat) {
    let selection = settings.selection(args.consumer);

    let provider_id = match args
        .provider
        .as_deref()
        .or_else(|| selection.and_then(|s| s.provider_id()))
    {
        Some(id) => id,
        None => crate::die!(
            "{} has no bound provider, pass one explicitly",
            args.consumer
        ),
    };

    let provider = match settings.provider(provider_id) {
        Ok(provider) => provider,
        Err(err) => crate::die!("{}", err),
    };

    let models = match settings.effective_models(args.consumer, provider_id) {
        Ok(models) => models,
        Err(err) => crate::die!("failed to list models: {}", err),
    };

    let selected = selection
        .filter(|s| s.provider_id() == Some(provider_id))
        .and_then(|s| s.model_id());

    let rows: Vec<ModelRow> = models
        .into_iter()
        .map(|model_id| ModelRow {
            sent_as: provider
                .connectors
                .get(&args.consumer)
                .map_or(model_id.as_str(), |c| c.resolve_model(&model_id))
                .to_string(),
            recommended: provider.recommended_default(args.consumer) == Some(model_id.as_str()),
            selected: selected == Some(model_id.as_str()),
            model_id,
        })
        .collect();

    format_output(rows, format);
}
