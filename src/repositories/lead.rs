//! # Lead Repository

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::lead::{ActiveModel as LeadActiveModel, Column, Entity as Lead, Model as LeadModel};
use crate::models::{LeadStatus, Property, property};
use crate::repositories::lower_contains;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A sanitised lead ready to be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLead {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub mensagem: Option<String>,
    pub assunto: Option<String>,
    pub pagina_origem: Option<String>,
    pub imovel_id: Option<Uuid>,
}

/// Filters for the admin lead list.
#[derive(Debug, Clone, Default)]
pub struct LeadListQuery {
    /// 1-based page number
    pub page: u64,
    pub limit: u64,
    pub status: Option<LeadStatus>,
    pub search: Option<String>,
}

impl LeadListQuery {
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u64 {
        match self.limit {
            0 => DEFAULT_PAGE_SIZE,
            limit => limit.min(MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip, saturating for pages far past the end.
    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// A lead with the title and slug of the listing it refers to.
#[derive(Debug, Clone)]
pub struct LeadWithProperty {
    pub lead: LeadModel,
    pub property: Option<(String, String)>,
}

pub struct LeadRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LeadRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores a new lead with status `Novo`.
    pub async fn create(&self, lead: NewLead) -> Result<LeadModel, RepositoryError> {
        let now = Utc::now();

        LeadActiveModel {
            id: Set(Uuid::new_v4()),
            nome: Set(lead.nome),
            email: Set(lead.email),
            telefone: Set(lead.telefone),
            mensagem: Set(lead.mensagem),
            assunto: Set(lead.assunto),
            pagina_origem: Set(lead.pagina_origem),
            imovel_id: Set(lead.imovel_id),
            status: Set(LeadStatus::Novo.as_str().to_string()),
            data_criacao: Set(now.into()),
            data_atualizacao: Set(now.into()),
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<LeadModel, RepositoryError> {
        let lead = Lead::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)?
            .ok_or_else(|| RepositoryError::not_found("Lead not found"))?;

        let mut lead = lead.into_active_model();
        lead.status = Set(status.as_str().to_string());
        lead.data_atualizacao = Set(Utc::now().into());

        lead.update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// One page of leads, newest first, plus the total matching count.
    pub async fn list(
        &self,
        query: &LeadListQuery,
    ) -> Result<(Vec<LeadWithProperty>, u64), RepositoryError> {
        let filtered = Self::filtered(query);

        let total = filtered
            .clone()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let offset = query.offset();
        if offset >= total {
            return Ok((Vec::new(), total));
        }

        let rows = filtered
            .order_by_desc(Column::DataCriacao)
            .offset(offset)
            .limit(query.limit())
            .find_also_related(Property)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let leads = rows
            .into_iter()
            .map(|(lead, property): (LeadModel, Option<property::Model>)| LeadWithProperty {
                lead,
                property: property.map(|p| (p.titulo, p.slug)),
            })
            .collect();

        Ok((leads, total))
    }

    /// Number of leads in each status, including zero counts.
    pub async fn status_counts(&self) -> Result<BTreeMap<String, u64>, RepositoryError> {
        let mut counts = BTreeMap::new();
        for status in LeadStatus::ALL {
            let count = Lead::find()
                .filter(Column::Status.eq(status.as_str()))
                .count(self.db)
                .await
                .map_err(RepositoryError::database_error)?;
            counts.insert(status.as_str().to_string(), count);
        }
        Ok(counts)
    }

    fn filtered(query: &LeadListQuery) -> Select<Lead> {
        let mut select = Lead::find();

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(lower_contains(Column::Nome, term))
                    .add(lower_contains(Column::Email, term))
                    .add(lower_contains(Column::Telefone, term))
                    .add(lower_contains(Column::Mensagem, term)),
            );
        }

        select
    }
}
