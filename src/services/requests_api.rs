//! Join-request endpoints over the query cache
//!
//! Besides the cached reads and writes this owns the locally submitted
//! set: the (requester, ride) pairs this client instance has sent. Together
//! with the cached request list it backs a duplicate-request guard that
//! never touches the network.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::cache::{CacheConfig, CacheStats, QueryCache, Tag, TagType};
use crate::clients::RideDataSource;
use crate::models::{Identity, NewRideRequest, RequestStatus, Ride, RideRequest};
use crate::utils::errors::{forbidden_error, AppResult};

const REQUESTS_KEY: &str = "requests";

fn request_key(id: &str) -> String {
    format!("requests/{}", id)
}

/// Result of asking to join a ride
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Created(RideRequest),
    AlreadyRequested,
}

pub struct RequestsApi {
    source: Arc<dyn RideDataSource>,
    lists: QueryCache<Vec<RideRequest>>,
    details: QueryCache<RideRequest>,
    submitted: RwLock<HashSet<(String, String)>>,
}

impl RequestsApi {
    pub fn new(source: Arc<dyn RideDataSource>, config: CacheConfig) -> Self {
        Self {
            source,
            lists: QueryCache::new(config),
            details: QueryCache::new(config),
            submitted: RwLock::new(HashSet::new()),
        }
    }

    pub async fn fetch_all_requests(&self) -> AppResult<Vec<RideRequest>> {
        self.lists
            .query(REQUESTS_KEY, vec![Tag::collection(TagType::RideRequests)], || {
                self.source.list_requests()
            })
            .await
    }

    /// Force a fresh read of the request list
    pub async fn refresh_requests(&self) -> AppResult<Vec<RideRequest>> {
        self.lists
            .refetch(REQUESTS_KEY, vec![Tag::collection(TagType::RideRequests)], || {
                self.source.list_requests()
            })
            .await
    }

    pub async fn fetch_request_by_id(&self, id: &str) -> AppResult<RideRequest> {
        self.details
            .query(
                &request_key(id),
                vec![Tag::item(TagType::RideRequests, id)],
                || self.source.get_request(id),
            )
            .await
    }

    pub async fn add_ride_request(&self, request: &NewRideRequest) -> AppResult<RideRequest> {
        let created = self.source.create_request(request).await?;
        self.mark_submitted(&request.requester_id, &request.ride_id).await;
        self.invalidate(&[Tag::collection(TagType::RideRequests)]).await;
        Ok(created)
    }

    /// Send the new status and patch cached lists in place. The request
    /// detail is invalidated and refetched on next read.
    pub async fn update_request_status(&self, request_id: &str, status: RequestStatus) -> AppResult<()> {
        self.source.update_request_status(request_id, status).await?;

        self.invalidate(&[Tag::item(TagType::RideRequests, request_id)])
            .await;
        self.lists
            .update_cached(REQUESTS_KEY, |requests| {
                for request in requests.iter_mut().filter(|r| r.id == request_id) {
                    request.status = status;
                }
            })
            .await;

        Ok(())
    }

    /// Best-effort duplicate check against the locally submitted set and the
    /// last fetched request list
    pub async fn has_requested(&self, requester_id: &str, ride_id: &str) -> bool {
        if self
            .submitted
            .read()
            .await
            .contains(&(requester_id.to_string(), ride_id.to_string()))
        {
            return true;
        }

        self.lists
            .get_cached(REQUESTS_KEY)
            .await
            .map_or(false, |requests| {
                requests.iter().any(|r| r.is_for(requester_id, ride_id))
            })
    }

    /// Ask to join `ride` unless this requester already did
    pub async fn request_to_join(&self, ride: &Ride, requester: &Identity) -> AppResult<JoinOutcome> {
        if ride.driver_id == requester.uid {
            return Err(forbidden_error("request a seat", "you are the driver of this ride"));
        }

        if self.has_requested(&requester.uid, &ride.id).await {
            log::info!("ℹ️ {} already requested ride {}", requester.uid, ride.id);
            return Ok(JoinOutcome::AlreadyRequested);
        }

        let request = NewRideRequest::for_ride(ride, requester);
        let created = self.add_ride_request(&request).await?;
        Ok(JoinOutcome::Created(created))
    }

    /// Driver decision on a pending request
    pub async fn decide(&self, request_id: &str, driver: &Identity, next: RequestStatus) -> AppResult<RideRequest> {
        let current = self.fetch_request_by_id(request_id).await?;

        if current.driver_id != driver.uid {
            return Err(forbidden_error(
                "change this request",
                "only the ride's driver can accept or reject it",
            ));
        }
        let status = current.status.transition(next)?;

        self.update_request_status(request_id, status).await?;
        Ok(RideRequest { status, ..current })
    }

    pub async fn mark_submitted(&self, requester_id: &str, ride_id: &str) {
        self.submitted
            .write()
            .await
            .insert((requester_id.to_string(), ride_id.to_string()));
    }

    pub async fn unmark_submitted(&self, requester_id: &str, ride_id: &str) -> bool {
        self.submitted
            .write()
            .await
            .remove(&(requester_id.to_string(), ride_id.to_string()))
    }

    pub async fn clear_submitted(&self) {
        self.submitted.write().await.clear();
    }

    pub async fn invalidate(&self, tags: &[Tag]) -> usize {
        self.lists.invalidate(tags).await + self.details.invalidate(tags).await
    }

    pub async fn stats(&self) -> (CacheStats, CacheStats) {
        (self.lists.stats().await, self.details.stats().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fakes::{identity, sample_ride, FakeDataSource};
    use crate::utils::errors::AppError;

    async fn setup() -> (Arc<FakeDataSource>, RequestsApi) {
        let source = Arc::new(FakeDataSource::default());
        source.insert_ride(sample_ride("r1", "2030-01-01")).await;
        let api = RequestsApi::new(source.clone(), CacheConfig::default());
        (source, api)
    }

    #[tokio::test]
    async fn test_duplicate_guard_needs_no_network() {
        let (source, api) = setup().await;
        let ride = sample_ride("r1", "2030-01-01");
        let rider = identity("rider-1");

        let first = api.request_to_join(&ride, &rider).await.unwrap();
        assert!(matches!(first, JoinOutcome::Created(_)));

        let calls_before = source.total_calls();
        let second = api.request_to_join(&ride, &rider).await.unwrap();
        assert_eq!(second, JoinOutcome::AlreadyRequested);
        assert_eq!(source.total_calls(), calls_before);
        assert_eq!(source.calls("create_request"), 1);
    }

    #[tokio::test]
    async fn test_guard_sees_requests_from_cached_list() {
        let (source, api) = setup().await;
        let ride = sample_ride("r1", "2030-01-01");
        let rider = identity("rider-1");
        source
            .create_request(&NewRideRequest::for_ride(&ride, &rider))
            .await
            .unwrap();

        assert!(!api.has_requested("rider-1", "r1").await);
        api.fetch_all_requests().await.unwrap();
        assert!(api.has_requested("rider-1", "r1").await);
        assert!(!api.has_requested("rider-2", "r1").await);
    }

    #[tokio::test]
    async fn test_driver_cannot_request_own_ride() {
        let (_, api) = setup().await;
        let ride = sample_ride("r1", "2030-01-01");
        let result = api.request_to_join(&ride, &identity("driver-1")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_accept_patches_list_and_refetches_detail() {
        let (source, api) = setup().await;
        let ride = sample_ride("r1", "2030-01-01");
        let JoinOutcome::Created(request) =
            api.request_to_join(&ride, &identity("rider-1")).await.unwrap()
        else {
            panic!("request should be created");
        };

        api.fetch_all_requests().await.unwrap();
        api.fetch_request_by_id(&request.id).await.unwrap();

        let updated = api
            .decide(&request.id, &identity("driver-1"), RequestStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Accepted);

        let list = api.fetch_all_requests().await.unwrap();
        assert_eq!(list[0].status, RequestStatus::Accepted);
        assert_eq!(source.calls("list_requests"), 1);

        let detail = api.fetch_request_by_id(&request.id).await.unwrap();
        assert_eq!(detail.status, RequestStatus::Accepted);
        assert_eq!(source.calls("get_request"), 2);
    }

    #[tokio::test]
    async fn test_settled_requests_cannot_change() {
        let (source, api) = setup().await;
        let ride = sample_ride("r1", "2030-01-01");
        let JoinOutcome::Created(request) =
            api.request_to_join(&ride, &identity("rider-1")).await.unwrap()
        else {
            panic!("request should be created");
        };
        source.set_status(&request.id, RequestStatus::Rejected).await;

        let result = api
            .decide(&request.id, &identity("driver-1"), RequestStatus::Accepted)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(source.calls("update_request_status"), 0);
    }

    #[tokio::test]
    async fn test_only_driver_decides() {
        let (_, api) = setup().await;
        let ride = sample_ride("r1", "2030-01-01");
        let JoinOutcome::Created(request) =
            api.request_to_join(&ride, &identity("rider-1")).await.unwrap()
        else {
            panic!("request should be created");
        };

        let result = api
            .decide(&request.id, &identity("rider-1"), RequestStatus::Accepted)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_submitted_set_can_be_cleared() {
        let (_, api) = setup().await;
        api.mark_submitted("u", "r1").await;
        assert!(api.has_requested("u", "r1").await);
        assert!(api.unmark_submitted("u", "r1").await);
        api.mark_submitted("u", "r2").await;
        api.clear_submitted().await;
        assert!(!api.has_requested("u", "r2").await);
    }
}
