use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

// --- Internal records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeAtCompany {
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetails {
    pub id: String,
    pub title: Option<String>, // None only for a malformed payload
    pub rating: f64,
    pub location: String,
    pub employment_type: String,
    pub package_per_annum: String,
    pub description: String,
    pub company_logo_url: String,
    pub company_website_url: String,
    pub skills: Vec<Skill>,
    pub life_at_company: LifeAtCompany,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarJob {
    pub id: String,
    pub title: String,
    pub rating: f64,
    pub location: String,
    pub employment_type: String,
    pub description: String,
    pub company_logo_url: String,
}

/// Everything one successful request yields.
#[derive(Debug, Clone, PartialEq)]
pub struct JobPayload {
    pub job: JobDetails,
    pub similar_jobs: Vec<SimilarJob>,
}

// --- Wire schema (jobs API) ---

// Absent and null scalars both become the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct ApiSkill {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiLifeAtCompany {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiJobDetails {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub package_per_annum: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_logo_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_website_url: String,
    pub skills: Vec<ApiSkill>,
    pub life_at_company: ApiLifeAtCompany,
}

#[derive(Debug, Deserialize)]
pub struct ApiSimilarJob {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_logo_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiJobResponse {
    pub job_details: ApiJobDetails,
    pub similar_jobs: Vec<ApiSimilarJob>,
}

/// Reshapes an API response into internal records. `requested_id` fills in
/// the job id when the payload does not carry one.
pub fn map_response(requested_id: &str, response: ApiJobResponse) -> JobPayload {
    let details = response.job_details;

    let job = JobDetails {
        id: details.id.unwrap_or_else(|| requested_id.to_string()),
        title: details.title,
        rating: details.rating,
        location: details.location,
        employment_type: details.employment_type,
        package_per_annum: details.package_per_annum,
        description: details.job_description,
        company_logo_url: details.company_logo_url,
        company_website_url: details.company_website_url,
        skills: details
            .skills
            .into_iter()
            .map(|s| Skill {
                name: s.name,
                image_url: s.image_url,
            })
            .collect(),
        life_at_company: LifeAtCompany {
            description: details.life_at_company.description,
            image_url: details.life_at_company.image_url,
        },
    };

    let similar_jobs = response
        .similar_jobs
        .into_iter()
        .map(|j| SimilarJob {
            id: j.id,
            title: j.title,
            rating: j.rating,
            location: j.location,
            employment_type: j.employment_type,
            description: j.job_description,
            company_logo_url: j.company_logo_url,
        })
        .collect();

    JobPayload { job, similar_jobs }
}

pub fn parse_payload(requested_id: &str, body: &str) -> Result<JobPayload> {
    let response: ApiJobResponse =
        serde_json::from_str(body).context("Failed to parse job details response")?;
    Ok(map_response(requested_id, response))
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub fn job_body(title: Option<&str>) -> String {
        let mut details = serde_json::json!({
            "company_logo_url": "https://assets.example.com/logo.png",
            "company_website_url": "https://example.com",
            "employment_type": "Full Time",
            "job_description": "Build data pipelines.",
            "location": "Bangalore",
            "rating": 4,
            "package_per_annum": "21 LPA",
            "skills": [{"image_url": "a.png", "name": "Python"}],
            "life_at_company": {"description": "Flat teams.", "image_url": "life.png"}
        });
        if let Some(title) = title {
            details["title"] = serde_json::json!(title);
        }
        serde_json::json!({ "job_details": details, "similar_jobs": [] }).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_response_single_skill_no_similar() {
        let payload = parse_payload("123", &fixtures::job_body(Some("Data Engineer"))).unwrap();

        assert_eq!(payload.job.id, "123");
        assert_eq!(payload.job.title.as_deref(), Some("Data Engineer"));
        assert_eq!(
            payload.job.skills,
            vec![Skill {
                name: "Python".to_string(),
                image_url: "a.png".to_string()
            }]
        );
        assert!(payload.similar_jobs.is_empty());
        assert_eq!(payload.job.description, "Build data pipelines.");
        assert_eq!(payload.job.package_per_annum, "21 LPA");
        assert_eq!(payload.job.life_at_company.image_url, "life.png");
        assert_eq!(payload.job.rating, 4.0);
    }

    #[test]
    fn test_map_response_keeps_similar_job_order() {
        let body = r#"{
            "job_details": {
                "id": "abc", "title": "Backend Engineer",
                "skills": [], "life_at_company": {"description": "", "image_url": ""}
            },
            "similar_jobs": [
                {"id": "s1", "title": "First", "rating": 3.5, "location": "Delhi",
                 "employment_type": "Internship", "job_description": "one",
                 "company_logo_url": "l1.png"},
                {"id": "s2", "title": "Second", "rating": 5, "location": "Mumbai",
                 "employment_type": "Part Time", "job_description": "two",
                 "company_logo_url": "l2.png"}
            ]
        }"#;
        let payload = parse_payload("ignored", body).unwrap();

        assert_eq!(payload.job.id, "abc");
        let ids: Vec<&str> = payload.similar_jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
        assert_eq!(payload.similar_jobs[0].description, "one");
        assert_eq!(payload.similar_jobs[0].rating, 3.5);
        assert_eq!(payload.similar_jobs[1].employment_type, "Part Time");
    }

    #[test]
    fn test_missing_title_is_not_a_parse_error() {
        let payload = parse_payload("9", &fixtures::job_body(None)).unwrap();
        assert_eq!(payload.job.title, None);
    }

    #[test]
    fn test_null_scalars_are_tolerated() {
        let body = r#"{
            "job_details": {
                "title": "SDE", "rating": null, "location": null,
                "package_per_annum": null, "company_website_url": null,
                "skills": [{"name": null, "image_url": "a.png"}],
                "life_at_company": {"description": null, "image_url": null}
            },
            "similar_jobs": [{"id": "s1", "title": "QA", "rating": null, "location": null}]
        }"#;
        let payload = parse_payload("5", body).unwrap();

        assert_eq!(payload.job.rating, 0.0);
        assert_eq!(payload.job.location, "");
        assert_eq!(payload.job.skills[0].name, "");
        assert_eq!(payload.job.life_at_company.description, "");
        assert_eq!(payload.similar_jobs[0].rating, 0.0);
        assert_eq!(payload.similar_jobs[0].title, "QA");
    }

    #[test]
    fn test_missing_structure_is_a_parse_error() {
        assert!(parse_payload("1", r#"{"job_details": {"title": "x"}, "similar_jobs": []}"#).is_err());
        assert!(parse_payload("1", r#"{"similar_jobs": []}"#).is_err());
        assert!(parse_payload("1", "not json").is_err());
    }
}
