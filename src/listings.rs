//! Public listing presentation: display cards, option phrasing, price
//! formatting and the listing page filters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::images::{PropertyImages, card_image_url};
use crate::models::property::Model as PropertyModel;
use crate::properties::AVAILABLE_FEATURES;

/// Listings shown on the home page.
pub const HOME_FEED_SIZE: usize = 6;
/// Related listings shown under a detail page.
pub const RELATED_SIZE: usize = 6;

const NO_VALUE: &str = "Consulte";
const NOT_INFORMED: &str = "Não informado";

/// A listing as rendered on cards across the public site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PropertyCard {
    pub id: Uuid,
    pub title: String,
    pub neighborhood: String,
    pub status: String,
    pub description: String,
    #[schema(example = "R$ 850.000")]
    pub price: String,
    pub area: String,
    #[schema(example = "2 e 3 dormitórios")]
    pub bedrooms: String,
    pub parking: String,
    pub bathrooms: String,
    pub image: String,
    #[schema(example = "/empreendimentos/residencial-jardins")]
    pub link: String,
    pub cidade: String,
    pub status_empreendimento: String,
    pub valor: f64,
    pub tipo: Vec<String>,
    pub caracteristicas: Vec<String>,
    pub areas_disponiveis: Vec<f64>,
}

impl PropertyCard {
    pub fn from_property(property: &PropertyModel, images: Option<&PropertyImages>) -> Self {
        let image = images.map_or_else(
            || card_image_url(&PropertyImages::default()),
            card_image_url,
        );

        Self {
            id: property.id,
            title: property.titulo.clone(),
            neighborhood: property.bairro.clone(),
            status: property.status_empreendimento.clone(),
            description: property.titulo_descricao.clone(),
            price: format_price(property.valor),
            area: property.area_texto.clone(),
            bedrooms: format_options(&property.quartos.0, "dormitório"),
            parking: format_options(&property.vagas.0, "vaga"),
            bathrooms: format_options(&property.banheiros.0, "banheiro"),
            image,
            link: format!("/empreendimentos/{}", property.slug),
            cidade: property.cidade.clone(),
            status_empreendimento: property.status_empreendimento.clone(),
            valor: property.valor,
            tipo: property.tipo_imovel.0.clone(),
            caracteristicas: property.caracteristicas.0.clone(),
            areas_disponiveis: property.areas_disponiveis.0.clone(),
        }
    }
}

/// `R$ 1.234.567` with pt-BR grouping, or "Consulte" for non-positive
/// prices. Up to three fraction digits are kept, without trailing zeros.
pub fn format_price(valor: f64) -> String {
    if !valor.is_finite() || valor <= 0.0 {
        return NO_VALUE.to_string();
    }

    let scaled = (valor * 1000.0).round() as u128;
    let integer = scaled / 1000;
    let fraction = scaled % 1000;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if fraction > 0 {
        let fraction = format!("{fraction:03}");
        grouped.push(',');
        grouped.push_str(fraction.trim_end_matches('0'));
    }

    format!("R$ {grouped}")
}

fn join_pt(values: &[&str]) -> String {
    match values {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} e {last}", init.join(", ")),
    }
}

/// Card phrasing: "2 dormitórios", "2 e 3 dormitórios", "1, 2 e 3 dormitórios",
/// "Consulte" when empty.
pub fn format_options(values: &[String], noun: &str) -> String {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return NO_VALUE.to_string();
    }
    format!("{} {noun}s", join_pt(&values))
}

/// Detail page phrasing: unique values in numeric order, singular noun for a
/// single value, "Não informado" when empty.
pub fn format_detail_options(values: &[String], noun: &str) -> String {
    let mut unique: Vec<&str> = Vec::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    // Non-numeric values keep their relative order after the numeric ones.
    unique.sort_by(|a, b| match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => std::cmp::Ordering::Equal,
    });

    match unique.as_slice() {
        [] => NOT_INFORMED.to_string(),
        [only] => format!("{only} {noun}"),
        many => format!("{} {noun}s", join_pt(many)),
    }
}

/// Query string of the public listing page.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Neighbourhood or city, case-insensitive substring
    pub bairro: Option<String>,
    /// Exact construction stage
    pub estagio: Option<String>,
    /// Comma-separated property kinds
    pub tipo: Option<String>,
    /// Substring of the bedrooms phrase, e.g. `3`
    pub dormitorios: Option<String>,
    /// Area bucket: `50`, `100`, `150` or `200`
    pub area: Option<String>,
    pub valor_min: Option<String>,
    pub valor_max: Option<String>,
    /// Comma-separated amenities
    pub caracteristicas: Option<String>,
}

/// Parsed listing filters. Blank values mean "no filter".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    pub bairro: Option<String>,
    pub estagio: Option<String>,
    pub tipo: Vec<String>,
    pub dormitorios: Option<String>,
    pub area: Option<String>,
    pub valor_min: Option<f64>,
    pub valor_max: Option<f64>,
    pub caracteristicas: Vec<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn comma_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl From<ListingQuery> for ListingFilters {
    fn from(query: ListingQuery) -> Self {
        // Unparseable bounds are ignored rather than matching nothing.
        let bound = |value: Option<String>| non_blank(value).and_then(|v| v.parse::<f64>().ok());

        Self {
            bairro: non_blank(query.bairro),
            estagio: non_blank(query.estagio),
            tipo: comma_list(query.tipo),
            dormitorios: non_blank(query.dormitorios),
            area: non_blank(query.area),
            valor_min: bound(query.valor_min),
            valor_max: bound(query.valor_max),
            caracteristicas: comma_list(query.caracteristicas),
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn any_tag_matches(requested: &[String], tags: &[String]) -> bool {
    requested
        .iter()
        .any(|wanted| tags.iter().any(|tag| contains_ci(tag, wanted)))
}

fn in_area_bucket(bucket: &str, areas: &[f64]) -> bool {
    if areas.is_empty() {
        return false;
    }
    match bucket {
        "50" => areas.iter().any(|&a| a <= 50.0),
        "100" => areas.iter().any(|&a| a > 50.0 && a <= 100.0),
        "150" => areas.iter().any(|&a| a > 100.0 && a <= 150.0),
        "200" => areas.iter().any(|&a| a > 150.0),
        _ => true,
    }
}

impl ListingFilters {
    pub fn matches(&self, card: &PropertyCard) -> bool {
        if let Some(ref bairro) = self.bairro
            && !contains_ci(&card.neighborhood, bairro)
            && !contains_ci(&card.cidade, bairro)
        {
            return false;
        }
        if let Some(ref estagio) = self.estagio
            && card.status_empreendimento != *estagio
        {
            return false;
        }
        if let Some(ref dormitorios) = self.dormitorios
            && !contains_ci(&card.bedrooms, dormitorios)
        {
            return false;
        }
        if let Some(ref bucket) = self.area
            && !in_area_bucket(bucket, &card.areas_disponiveis)
        {
            return false;
        }
        if self.valor_min.is_some_and(|min| card.valor < min) {
            return false;
        }
        if self.valor_max.is_some_and(|max| card.valor > max) {
            return false;
        }
        if !self.caracteristicas.is_empty()
            && !any_tag_matches(&self.caracteristicas, &card.caracteristicas)
        {
            return false;
        }
        if !self.tipo.is_empty() && !any_tag_matches(&self.tipo, &card.tipo) {
            return false;
        }
        true
    }

    pub fn apply(&self, cards: Vec<PropertyCard>) -> Vec<PropertyCard> {
        cards.into_iter().filter(|card| self.matches(card)).collect()
    }
}

/// Values offered by the listing page filter controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FilterOptions {
    pub bairros: Vec<String>,
    pub estagios: Vec<String>,
    pub tipos: Vec<String>,
    pub dormitorios: Vec<String>,
    pub caracteristicas: Vec<String>,
}

impl FilterOptions {
    pub fn from_cards(cards: &[PropertyCard]) -> Self {
        let mut bairros = BTreeSet::new();
        let mut estagios = BTreeSet::new();
        let mut tipos = BTreeSet::new();
        let mut dormitorios = BTreeSet::new();

        for card in cards {
            if !card.neighborhood.is_empty() {
                bairros.insert(card.neighborhood.clone());
            }
            if !card.status_empreendimento.is_empty() {
                estagios.insert(card.status_empreendimento.clone());
            }
            tipos.extend(card.tipo.iter().filter(|t| !t.is_empty()).cloned());
            if card.bedrooms != NO_VALUE {
                dormitorios.insert(card.bedrooms.clone());
            }
        }

        Self {
            bairros: bairros.into_iter().collect(),
            estagios: estagios.into_iter().collect(),
            tipos: tipos.into_iter().collect(),
            dormitorios: dormitorios.into_iter().collect(),
            caracteristicas: AVAILABLE_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }
}
