//! Ticket processing pipeline (C9): classify, geocode, select office,
//! filter managers, round-robin assign, persist.

use std::sync::Arc;

use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::db::{
    AnalyticsRepositoryPort, AssignmentRepositoryPort, ManagerRepositoryPort, OfficeRepositoryPort,
    RoundRobinRepositoryPort, TicketRepositoryPort,
};
use crate::domain::{GeoStatus, Position, Ticket, TicketType};
use crate::error::RouterError;
use crate::geocoder::Geocoder;
use crate::policy::{determine_required_skills, manager_satisfies, select_fallback, select_nearest, HubNames};

const FALLBACK_RR_KEY: &str = "office-fallback-50-50";

/// Outcome of processing a single ticket, mirroring what a caller needs
/// to report without holding onto full domain objects.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub ticket_id: i32,
    pub ticket_guid: String,
    pub assigned_manager: Option<String>,
    pub assigned_office: Option<String>,
    pub distance_km: Option<f64>,
    pub fallback_used: bool,
    pub error: Option<String>,
}

impl ProcessingResult {
    fn skipped(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            ticket_guid: ticket.guid.clone(),
            assigned_manager: None,
            assigned_office: None,
            distance_km: None,
            fallback_used: false,
            error: None,
        }
    }

    pub(crate) fn failed(ticket: &Ticket, fallback_used: bool, error: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket.id,
            ticket_guid: ticket.guid.clone(),
            assigned_manager: None,
            assigned_office: None,
            distance_km: None,
            fallback_used,
            error: Some(error.into()),
        }
    }
}

pub struct TicketPipeline {
    classifier: Arc<dyn Classifier>,
    geocoder: Arc<dyn Geocoder>,
    tickets: Arc<dyn TicketRepositoryPort>,
    managers: Arc<dyn ManagerRepositoryPort>,
    offices: Arc<dyn OfficeRepositoryPort>,
    assignments: Arc<dyn AssignmentRepositoryPort>,
    analytics: Arc<dyn AnalyticsRepositoryPort>,
    round_robin: Arc<dyn RoundRobinRepositoryPort>,
    domestic_country_name: String,
    hub_office_a: String,
    hub_office_b: String,
    allow_sorted_fallback: bool,
}

impl TicketPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        classifier: Arc<dyn Classifier>,
        geocoder: Arc<dyn Geocoder>,
        tickets: Arc<dyn TicketRepositoryPort>,
        managers: Arc<dyn ManagerRepositoryPort>,
        offices: Arc<dyn OfficeRepositoryPort>,
        assignments: Arc<dyn AssignmentRepositoryPort>,
        analytics: Arc<dyn AnalyticsRepositoryPort>,
        round_robin: Arc<dyn RoundRobinRepositoryPort>,
        domestic_country_name: String,
        hub_office_a: String,
        hub_office_b: String,
        allow_sorted_fallback: bool,
    ) -> Self {
        Self {
            classifier,
            geocoder,
            tickets,
            managers,
            offices,
            assignments,
            analytics,
            round_robin,
            domestic_country_name,
            hub_office_a,
            hub_office_b,
            allow_sorted_fallback,
        }
    }

    pub fn ticket_repository(&self) -> &Arc<dyn TicketRepositoryPort> {
        &self.tickets
    }

    pub fn office_repository(&self) -> &Arc<dyn OfficeRepositoryPort> {
        &self.offices
    }

    pub fn geocoder(&self) -> &Arc<dyn Geocoder> {
        &self.geocoder
    }

    /// Process one ticket end to end. Never returns `Err` for business
    /// conditions (no eligible manager, geocode miss) — those surface as
    /// `ProcessingResult::error`. Only infrastructure failures (DB, pool)
    /// propagate as `Result::Err`.
    pub async fn process(&self, mut ticket: Ticket) -> Result<ProcessingResult, RouterError> {
        // Idempotence: a ticket that already has an Assignment has already
        // run the full pipeline; return its recorded outcome rather than
        // re-processing (and re-inserting a row the unique constraints on
        // ticket_id would reject).
        if let Some(existing) = self.assignments.get_by_ticket(ticket.id).await? {
            let manager_name = self.managers.get_by_id(existing.manager_id).await?.map(|m| m.name);
            let office_name = self.offices.get_by_id(existing.office_id).await?.map(|o| o.name);
            info!(guid = %ticket.guid, "ticket already assigned, returning recorded result");
            return Ok(ProcessingResult {
                ticket_id: ticket.id,
                ticket_guid: ticket.guid,
                assigned_manager: manager_name,
                assigned_office: office_name,
                distance_km: existing.distance_km,
                fallback_used: existing.fallback_used,
                error: None,
            });
        }

        // Step 1: classify.
        let mut analysis = self.classifier.analyze(ticket.description.as_deref().unwrap_or(""), ticket.attachments.as_deref()).await;
        analysis.ticket_id = ticket.id;
        self.analytics.save(&analysis).await?;
        info!(
            guid = %ticket.guid,
            ticket_type = analysis.ticket_type.as_str(),
            language = analysis.language.as_str(),
            priority = analysis.priority_score,
            "classified ticket"
        );

        if analysis.ticket_type == TicketType::Spam {
            info!(guid = %ticket.guid, "spam ticket, skipping assignment");
            return Ok(ProcessingResult::skipped(&ticket));
        }

        // Step 2: geocode, if the client's location isn't already known.
        if !ticket.is_address_known() {
            let address = ticket.build_address_string(&self.domestic_country_name);
            let is_domestic = ticket.is_domestic(&self.domestic_country_name);

            ticket.geo_status = match (address, is_domestic) {
                (Some(address), true) => match self.geocoder.geocode(&address).await {
                    Some(point) => {
                        ticket.client_location = Some(point);
                        GeoStatus::Resolved
                    }
                    None => GeoStatus::Failed,
                },
                (_, false) if ticket.country.is_some() => GeoStatus::Abroad,
                _ => GeoStatus::Failed,
            };
            self.tickets.update(&ticket).await?;
        }

        // Step 3: select office.
        let offices = self.offices.get_all().await?;
        let office_sel = if let Some(location) = ticket.client_location {
            select_nearest(&location, &offices)
        } else {
            let hubs = HubNames { hub_a: &self.hub_office_a, hub_b: &self.hub_office_b, allow_sorted_fallback: self.allow_sorted_fallback };
            let counter = self.round_robin.increment_counter(FALLBACK_RR_KEY).await?;
            select_fallback(counter as i64, &offices, &hubs)
        };
        let office_sel = match office_sel {
            Ok(sel) => sel,
            Err(e) => return Ok(ProcessingResult::failed(&ticket, false, e.to_string())),
        };
        info!(guid = %ticket.guid, office = %office_sel.office_name, reason = %office_sel.reason, "selected office");

        // Step 4: filter managers by required skills/position, widening
        // the search when the selected office has no eligible manager.
        let requirement = determine_required_skills(ticket.segment, analysis.ticket_type, analysis.language);

        let mut eligible: Vec<_> = self
            .managers
            .get_by_office(office_sel.office_id)
            .await?
            .into_iter()
            .filter(|m| manager_satisfies(&m.skills, m.position, &requirement))
            .collect();

        let mut all_managers: Option<Vec<_>> = None;
        if eligible.is_empty() {
            warn!(guid = %ticket.guid, office = %office_sel.office_name, "no eligible managers in office, widening search");
            let all = self.managers.get_all().await?;
            eligible = all.iter().filter(|m| manager_satisfies(&m.skills, m.position, &requirement)).cloned().collect();
            all_managers = Some(all);
        }

        if eligible.is_empty() {
            warn!(guid = %ticket.guid, "no managers with required skills, relaxing to position-only");
            let all = match all_managers.take() {
                Some(all) => all,
                None => self.managers.get_all().await?,
            };
            eligible = if requirement.min_position == Some(Position::ChiefSpecialist) {
                all.into_iter().filter(|m| m.is_chief_specialist()).collect()
            } else {
                all
            };
        }

        if eligible.is_empty() {
            return Ok(ProcessingResult::failed(&ticket, office_sel.fallback_used, "no eligible managers found"));
        }

        // Step 5: top-2 by minimal load, then round-robin between them.
        eligible.sort_by_key(|m| (m.current_load, m.id));
        eligible.truncate(2);

        let rr_key = format!(
            "office-{}|vip-{}|lang-{}|type-{}|chief-{}",
            office_sel.office_id,
            requirement.required_skills.contains("VIP") as u8,
            analysis.language.as_str(),
            analysis.ticket_type.as_str(),
            (requirement.min_position == Some(Position::ChiefSpecialist)) as u8,
        );
        // Step 6 + 7: advance the counter, pick the manager it selects, write
        // the assignment, and bump that manager's load, all atomically so
        // the counter and the assignment row can never diverge.
        let (_assignment, chosen_id) = self
            .assignments
            .finalize_assignment(
                &rr_key,
                &eligible,
                ticket.id,
                office_sel.office_id,
                office_sel.distance_km,
                office_sel.reason.clone(),
                office_sel.fallback_used,
            )
            .await?;
        let chosen_name = eligible.iter().find(|m| m.id == chosen_id).map(|m| m.name.clone()).unwrap_or_default();

        info!(guid = %ticket.guid, manager = %chosen_name, office = %office_sel.office_name, "assigned ticket");

        Ok(ProcessingResult {
            ticket_id: ticket.id,
            ticket_guid: ticket.guid,
            assigned_manager: Some(chosen_name),
            assigned_office: Some(office_sel.office_name),
            distance_km: office_sel.distance_km,
            fallback_used: office_sel.fallback_used,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Analysis, Assignment, GeoPoint, Manager, Office, Position, Segment, Sentiment, TicketType};
    use crate::policy::pick_next;

    struct FakeClassifier {
        ticket_type: TicketType,
        language: crate::domain::Language,
    }

    impl FakeClassifier {
        fn new() -> Self {
            Self { ticket_type: TicketType::Consultation, language: crate::domain::Language::RU }
        }
    }

    #[async_trait]
    impl Classifier for FakeClassifier {
        async fn analyze(&self, _description: &str, _attachments: Option<&str>) -> Analysis {
            Analysis {
                id: None,
                ticket_id: 0,
                ticket_type: self.ticket_type,
                sentiment: Sentiment::Neutral,
                priority_score: 5,
                language: self.language,
                summary: "test".into(),
                model_tag: "fake".into(),
            }
        }
    }

    struct FakeGeocoder {
        result: Option<GeoPoint>,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, _address: &str) -> Option<GeoPoint> {
            self.result
        }
    }

    #[derive(Default)]
    struct FakeTicketRepo {
        tickets: Mutex<HashMap<i32, Ticket>>,
    }

    #[async_trait]
    impl TicketRepositoryPort for FakeTicketRepo {
        async fn save(&self, ticket: &Ticket) -> Result<Ticket, RouterError> {
            let mut tickets = self.tickets.lock().unwrap();
            let mut saved = ticket.clone();
            saved.id = tickets.len() as i32 + 1;
            tickets.insert(saved.id, saved.clone());
            Ok(saved)
        }

        async fn get_by_id(&self, ticket_id: i32) -> Result<Option<Ticket>, RouterError> {
            Ok(self.tickets.lock().unwrap().get(&ticket_id).cloned())
        }

        async fn get_by_guid(&self, guid: &str) -> Result<Option<Ticket>, RouterError> {
            Ok(self.tickets.lock().unwrap().values().find(|t| t.guid == guid).cloned())
        }

        async fn get_all(&self) -> Result<Vec<Ticket>, RouterError> {
            Ok(self.tickets.lock().unwrap().values().cloned().collect())
        }

        async fn get_unprocessed(&self) -> Result<Vec<Ticket>, RouterError> {
            Ok(self.tickets.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, ticket: &Ticket) -> Result<(), RouterError> {
            self.tickets.lock().unwrap().insert(ticket.id, ticket.clone());
            Ok(())
        }
    }

    struct FakeManagerRepo {
        managers: Mutex<HashMap<i32, Manager>>,
    }

    impl FakeManagerRepo {
        fn new(managers: Vec<Manager>) -> Self {
            Self { managers: Mutex::new(managers.into_iter().map(|m| (m.id, m)).collect()) }
        }
    }

    #[async_trait]
    impl ManagerRepositoryPort for FakeManagerRepo {
        async fn save(&self, manager: &Manager) -> Result<Manager, RouterError> {
            Ok(manager.clone())
        }

        async fn get_by_id(&self, manager_id: i32) -> Result<Option<Manager>, RouterError> {
            Ok(self.managers.lock().unwrap().get(&manager_id).cloned())
        }

        async fn get_by_office(&self, office_id: i32) -> Result<Vec<Manager>, RouterError> {
            Ok(self.managers.lock().unwrap().values().filter(|m| m.office_id == office_id).cloned().collect())
        }

        async fn get_all(&self) -> Result<Vec<Manager>, RouterError> {
            Ok(self.managers.lock().unwrap().values().cloned().collect())
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<Manager>, RouterError> {
            Ok(self.managers.lock().unwrap().values().find(|m| m.name == name).cloned())
        }

        async fn increment_load(&self, manager_id: i32) -> Result<(), RouterError> {
            if let Some(m) = self.managers.lock().unwrap().get_mut(&manager_id) {
                m.current_load += 1;
            }
            Ok(())
        }
    }

    struct FakeOfficeRepo {
        offices: Mutex<HashMap<i32, Office>>,
    }

    impl FakeOfficeRepo {
        fn new(offices: Vec<Office>) -> Self {
            Self { offices: Mutex::new(offices.into_iter().map(|o| (o.id, o)).collect()) }
        }
    }

    #[async_trait]
    impl OfficeRepositoryPort for FakeOfficeRepo {
        async fn save(&self, office: &Office) -> Result<Office, RouterError> {
            Ok(office.clone())
        }

        async fn get_by_id(&self, office_id: i32) -> Result<Option<Office>, RouterError> {
            Ok(self.offices.lock().unwrap().get(&office_id).cloned())
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<Office>, RouterError> {
            Ok(self.offices.lock().unwrap().values().find(|o| o.name == name).cloned())
        }

        async fn get_all(&self) -> Result<Vec<Office>, RouterError> {
            Ok(self.offices.lock().unwrap().values().cloned().collect())
        }

        async fn update_location(&self, office_id: i32, location: GeoPoint) -> Result<(), RouterError> {
            if let Some(o) = self.offices.lock().unwrap().get_mut(&office_id) {
                o.location = Some(location);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeAssignmentRepo {
        assignments: Mutex<Vec<Assignment>>,
        counters: Mutex<HashMap<String, i32>>,
    }

    #[async_trait]
    impl AssignmentRepositoryPort for FakeAssignmentRepo {
        async fn save(&self, assignment: &Assignment) -> Result<Assignment, RouterError> {
            let mut assignments = self.assignments.lock().unwrap();
            let mut saved = assignment.clone();
            saved.id = Some(assignments.len() as i32 + 1);
            assignments.push(saved.clone());
            Ok(saved)
        }

        async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Assignment>, RouterError> {
            Ok(self.assignments.lock().unwrap().iter().find(|a| a.ticket_id == ticket_id).cloned())
        }

        async fn get_all(&self) -> Result<Vec<Assignment>, RouterError> {
            Ok(self.assignments.lock().unwrap().clone())
        }

        async fn finalize_assignment(
            &self,
            rr_key: &str,
            candidates: &[Manager],
            ticket_id: i32,
            office_id: i32,
            distance_km: Option<f64>,
            reason: String,
            fallback_used: bool,
        ) -> Result<(Assignment, i32), RouterError> {
            let counter = {
                let mut counters = self.counters.lock().unwrap();
                let entry = counters.entry(rr_key.to_string()).or_insert(0);
                let old = *entry;
                *entry += 1;
                old
            };
            let (chosen, _) = pick_next(candidates, counter as i64)?;
            let chosen_id = chosen.id;

            let mut assignments = self.assignments.lock().unwrap();
            let assignment = Assignment {
                id: Some(assignments.len() as i32 + 1),
                ticket_id,
                manager_id: chosen_id,
                office_id,
                distance_km,
                reason,
                fallback_used,
            };
            assignments.push(assignment.clone());
            Ok((assignment, chosen_id))
        }
    }

    #[derive(Default)]
    struct FakeAnalyticsRepo {
        records: Mutex<Vec<Analysis>>,
    }

    #[async_trait]
    impl AnalyticsRepositoryPort for FakeAnalyticsRepo {
        async fn save(&self, analysis: &Analysis) -> Result<Analysis, RouterError> {
            let mut records = self.records.lock().unwrap();
            let mut saved = analysis.clone();
            saved.id = Some(records.len() as i32 + 1);
            records.push(saved.clone());
            Ok(saved)
        }

        async fn get_by_ticket(&self, ticket_id: i32) -> Result<Option<Analysis>, RouterError> {
            Ok(self.records.lock().unwrap().iter().find(|a| a.ticket_id == ticket_id).cloned())
        }

        async fn get_all(&self) -> Result<Vec<Analysis>, RouterError> {
            Ok(self.records.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct FakeRoundRobinRepo {
        counters: Mutex<HashMap<String, i32>>,
    }

    #[async_trait]
    impl RoundRobinRepositoryPort for FakeRoundRobinRepo {
        async fn get_counter(&self, rr_key: &str) -> Result<i32, RouterError> {
            Ok(*self.counters.lock().unwrap().get(rr_key).unwrap_or(&0))
        }

        async fn increment_counter(&self, rr_key: &str) -> Result<i32, RouterError> {
            let mut counters = self.counters.lock().unwrap();
            let old = *counters.get(rr_key).unwrap_or(&0);
            counters.insert(rr_key.to_string(), old + 1);
            Ok(old)
        }
    }

    fn almaty_office() -> Office {
        Office { id: 1, name: "Алматы ЦО".into(), address: "ул. Абая 1".into(), location: Some(GeoPoint::new(43.238949, 76.945465)) }
    }

    fn astana_office() -> Office {
        Office { id: 2, name: "Астана ЦО".into(), address: "пр. Мангилик Ел 1".into(), location: Some(GeoPoint::new(51.128207, 71.430411)) }
    }

    fn base_ticket(guid: &str, location: Option<GeoPoint>) -> Ticket {
        let id: i32 = guid.chars().filter(char::is_ascii_digit).collect::<String>().parse().unwrap_or(1);
        Ticket {
            id,
            guid: guid.into(),
            gender: None,
            birth_date: None,
            description: Some("Тестовая заявка".into()),
            attachments: None,
            segment: Segment::Mass,
            country: Some("Казахстан".into()),
            region: None,
            city: Some("Алматы".into()),
            street: None,
            building: None,
            client_location: location,
            geo_status: GeoStatus::Pending,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_pipeline(
        classifier: Arc<dyn Classifier>,
        geocoder_result: Option<GeoPoint>,
        managers: Vec<Manager>,
        offices: Vec<Office>,
        assignments: Arc<FakeAssignmentRepo>,
        analytics: Arc<FakeAnalyticsRepo>,
        round_robin: Arc<FakeRoundRobinRepo>,
    ) -> TicketPipeline {
        TicketPipeline::new(
            classifier,
            Arc::new(FakeGeocoder { result: geocoder_result }),
            Arc::new(FakeTicketRepo::default()),
            Arc::new(FakeManagerRepo::new(managers)),
            Arc::new(FakeOfficeRepo::new(offices)),
            assignments,
            analytics,
            round_robin,
            "Казахстан".into(),
            "Астана".into(),
            "Алматы".into(),
            false,
        )
    }

    fn default_managers() -> Vec<Manager> {
        vec![
            Manager { id: 1, name: "M1".into(), position: Position::Specialist, office_id: 1, skills: Default::default(), current_load: 0 },
            Manager { id: 2, name: "M2".into(), position: Position::Specialist, office_id: 1, skills: Default::default(), current_load: 0 },
        ]
    }

    #[tokio::test]
    async fn basic_assignment_near_almaty() {
        let pipeline = build_pipeline(
            Arc::new(FakeClassifier::new()),
            Some(GeoPoint::new(43.24, 76.95)),
            default_managers(),
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let ticket = base_ticket("t-1", Some(GeoPoint::new(43.24, 76.95)));
        let result = pipeline.process(ticket).await.unwrap();

        assert!(result.error.is_none());
        assert_eq!(result.assigned_office.as_deref(), Some("Алматы ЦО"));
        assert!(matches!(result.assigned_manager.as_deref(), Some("M1") | Some("M2")));
    }

    #[tokio::test]
    async fn vip_ticket_requires_vip_skill() {
        let managers = vec![
            Manager { id: 1, name: "NoSkill".into(), position: Position::Specialist, office_id: 1, skills: Default::default(), current_load: 0 },
            Manager { id: 2, name: "VIPMgr".into(), position: Position::Specialist, office_id: 1, skills: HashSet::from(["VIP".to_string()]), current_load: 0 },
        ];
        let pipeline = build_pipeline(
            Arc::new(FakeClassifier::new()),
            Some(GeoPoint::new(43.24, 76.95)),
            managers,
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let mut ticket = base_ticket("t-1", Some(GeoPoint::new(43.24, 76.95)));
        ticket.segment = Segment::VIP;
        let result = pipeline.process(ticket).await.unwrap();

        assert!(result.error.is_none());
        assert_eq!(result.assigned_manager.as_deref(), Some("VIPMgr"));
    }

    #[tokio::test]
    async fn data_change_requires_chief_specialist() {
        let managers = vec![
            Manager { id: 1, name: "Senior".into(), position: Position::SeniorSpecialist, office_id: 1, skills: Default::default(), current_load: 0 },
            Manager { id: 2, name: "Chief".into(), position: Position::ChiefSpecialist, office_id: 1, skills: Default::default(), current_load: 0 },
        ];
        let classifier = FakeClassifier { ticket_type: TicketType::DataChange, language: crate::domain::Language::RU };
        let pipeline = build_pipeline(
            Arc::new(classifier),
            Some(GeoPoint::new(43.24, 76.95)),
            managers,
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let ticket = base_ticket("t-1", Some(GeoPoint::new(43.24, 76.95)));
        let result = pipeline.process(ticket).await.unwrap();

        assert!(result.error.is_none());
        assert_eq!(result.assigned_manager.as_deref(), Some("Chief"));
    }

    #[tokio::test]
    async fn kz_language_requires_kz_skill() {
        let managers = vec![
            Manager { id: 1, name: "RuOnly".into(), position: Position::Specialist, office_id: 1, skills: Default::default(), current_load: 0 },
            Manager { id: 2, name: "KzMgr".into(), position: Position::Specialist, office_id: 1, skills: HashSet::from(["KZ".to_string()]), current_load: 0 },
        ];
        let classifier = FakeClassifier { ticket_type: TicketType::Consultation, language: crate::domain::Language::KZ };
        let pipeline = build_pipeline(
            Arc::new(classifier),
            Some(GeoPoint::new(43.24, 76.95)),
            managers,
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let ticket = base_ticket("t-1", Some(GeoPoint::new(43.24, 76.95)));
        let result = pipeline.process(ticket).await.unwrap();

        assert!(result.error.is_none());
        assert_eq!(result.assigned_manager.as_deref(), Some("KzMgr"));
    }

    #[tokio::test]
    async fn fallback_for_abroad_ticket() {
        let pipeline = build_pipeline(
            Arc::new(FakeClassifier::new()),
            Some(GeoPoint::new(43.24, 76.95)),
            default_managers(),
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let mut ticket = base_ticket("t-1", None);
        ticket.country = Some("Россия".into());
        ticket.city = Some("Москва".into());
        let result = pipeline.process(ticket).await.unwrap();

        assert!(result.error.is_none());
        assert!(result.fallback_used);
        assert!(matches!(result.assigned_office.as_deref(), Some("Алматы ЦО") | Some("Астана ЦО")));
    }

    #[tokio::test]
    async fn fallback_for_unknown_address() {
        let pipeline = build_pipeline(
            Arc::new(FakeClassifier::new()),
            None,
            default_managers(),
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let mut ticket = base_ticket("t-1", None);
        ticket.country = None;
        ticket.city = None;
        let result = pipeline.process(ticket).await.unwrap();

        assert!(result.error.is_none());
        assert!(result.fallback_used);
    }

    #[tokio::test]
    async fn round_robin_distributes_across_managers() {
        let assignments = Arc::new(FakeAssignmentRepo::default());
        let round_robin = Arc::new(FakeRoundRobinRepo::default());
        let pipeline = build_pipeline(
            Arc::new(FakeClassifier::new()),
            Some(GeoPoint::new(43.24, 76.95)),
            default_managers(),
            vec![almaty_office(), astana_office()],
            assignments,
            Arc::new(FakeAnalyticsRepo::default()),
            round_robin,
        );

        let mut assigned_names = std::collections::HashSet::new();
        for i in 0..4 {
            let ticket = base_ticket(&format!("t{i}"), Some(GeoPoint::new(43.24, 76.95)));
            let result = pipeline.process(ticket).await.unwrap();
            assert!(result.error.is_none());
            assigned_names.insert(result.assigned_manager.unwrap());
        }

        assert!(assigned_names.contains("M1"));
        assert!(assigned_names.contains("M2"));
    }

    #[tokio::test]
    async fn no_eligible_managers_returns_error() {
        let managers = vec![Manager {
            id: 1,
            name: "M1".into(),
            position: Position::Specialist,
            office_id: 99,
            skills: Default::default(),
            current_load: 0,
        }];
        let classifier = FakeClassifier { ticket_type: TicketType::DataChange, language: crate::domain::Language::RU };
        let pipeline = build_pipeline(
            Arc::new(classifier),
            Some(GeoPoint::new(43.24, 76.95)),
            managers,
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let ticket = base_ticket("t-1", Some(GeoPoint::new(43.24, 76.95)));
        let result = pipeline.process(ticket).await.unwrap();

        assert!(result.error.is_some());
        assert!(result.error.unwrap().contains("eligible managers"));
    }

    #[tokio::test]
    async fn reprocessing_an_assigned_ticket_is_a_no_op() {
        let assignments = Arc::new(FakeAssignmentRepo::default());
        let pipeline = build_pipeline(
            Arc::new(FakeClassifier::new()),
            Some(GeoPoint::new(43.24, 76.95)),
            default_managers(),
            vec![almaty_office(), astana_office()],
            assignments.clone(),
            Arc::new(FakeAnalyticsRepo::default()),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let ticket = base_ticket("t-1", Some(GeoPoint::new(43.24, 76.95)));
        let first = pipeline.process(ticket.clone()).await.unwrap();
        let second = pipeline.process(ticket).await.unwrap();

        assert_eq!(first.assigned_manager, second.assigned_manager);
        assert_eq!(first.assigned_office, second.assigned_office);
        assert_eq!(assignments.assignments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn analytics_persisted_for_every_ticket() {
        let analytics = Arc::new(FakeAnalyticsRepo::default());
        let pipeline = build_pipeline(
            Arc::new(FakeClassifier::new()),
            Some(GeoPoint::new(43.24, 76.95)),
            default_managers(),
            vec![almaty_office(), astana_office()],
            Arc::new(FakeAssignmentRepo::default()),
            analytics.clone(),
            Arc::new(FakeRoundRobinRepo::default()),
        );

        let ticket = base_ticket("t-1", Some(GeoPoint::new(43.24, 76.95)));
        let _ = pipeline.process(ticket).await.unwrap();

        assert!(analytics.records.lock().unwrap().len() == 1);
        assert!(analytics.records.lock().unwrap()[0].ticket_id == 1);
    }
}
