//! Business information tools for a web development agency.

use crate::error::RegistryError;
use crate::tools::schema::{ParamType, ParameterSchema};
use crate::tools::traits::{NoArgs, Tool, ToolDefinition};
use crate::tools::ToolRegistry;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};

const SERVICES: &[&str] = &[
    "Web Design",
    "Web Development",
    "E-commerce Solutions",
    "Mobile App Development",
    "SEO Optimization",
];

const PRICING: &[(&str, &str)] = &[
    ("Web Design", "$1,000 - $5,000"),
    ("Web Development", "$5,000 - $20,000"),
    ("E-commerce Solutions", "$10,000 - $50,000"),
    ("Mobile App Development", "$15,000 - $100,000"),
    ("SEO Optimization", "$500 - $2,000 per month"),
];

const HOURS: &[(&str, &str)] = &[
    ("Monday", "9:00 AM - 5:00 PM"),
    ("Tuesday", "9:00 AM - 5:00 PM"),
    ("Wednesday", "9:00 AM - 5:00 PM"),
    ("Thursday", "9:00 AM - 5:00 PM"),
    ("Friday", "9:00 AM - 5:00 PM"),
    ("Saturday", "Closed"),
    ("Sunday", "Closed"),
];

/// Register all business tools in their advertised order.
pub fn register_all(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(GetServices)?;
    registry.register(GetPricing)?;
    registry.register(GetBusinessHours)?;
    registry.register(GetLocation)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// get_services
// ---------------------------------------------------------------------------

pub struct GetServices;

#[derive(Debug, Serialize)]
pub struct ServiceList {
    pub services: Vec<&'static str>,
}

#[async_trait]
impl Tool for GetServices {
    type Args = NoArgs;
    type Output = ServiceList;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_services",
            "Get the list of services offered by the web development agency",
            ParameterSchema::empty(),
        )
    }

    async fn call(&self, _args: NoArgs) -> Result<ServiceList> {
        Ok(ServiceList {
            services: SERVICES.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// get_pricing
// ---------------------------------------------------------------------------

pub struct GetPricing;

#[derive(Debug, Deserialize)]
pub struct PricingArgs {
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct PricingInfo {
    pub service: String,
    pub pricing: String,
}

/// Price range for a service, matched exactly.
pub fn price_for(service: &str) -> Option<&'static str> {
    PRICING
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, price)| *price)
}

#[async_trait]
impl Tool for GetPricing {
    type Args = PricingArgs;
    type Output = PricingInfo;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_pricing",
            "Get pricing information for the web development agency's services",
            ParameterSchema::empty().required(
                "service",
                ParamType::String,
                "The specific service to get pricing for",
            ),
        )
    }

    async fn call(&self, args: PricingArgs) -> Result<PricingInfo> {
        let pricing = price_for(&args.service)
            .unwrap_or("Pricing not available for this service")
            .to_string();
        Ok(PricingInfo {
            service: args.service,
            pricing,
        })
    }
}

// ---------------------------------------------------------------------------
// get_business_hours
// ---------------------------------------------------------------------------

pub struct GetBusinessHours;

#[derive(Debug, Serialize)]
pub struct BusinessHours {
    /// Monday first, as declared.
    #[serde(serialize_with = "ordered_map")]
    pub hours: &'static [(&'static str, &'static str)],
}

fn ordered_map<S: Serializer>(
    pairs: &&'static [(&'static str, &'static str)],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(pairs.iter().map(|(day, hours)| (day, hours)))
}

#[async_trait]
impl Tool for GetBusinessHours {
    type Args = NoArgs;
    type Output = BusinessHours;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_business_hours",
            "Get the business hours for the web development agency",
            ParameterSchema::empty(),
        )
    }

    async fn call(&self, _args: NoArgs) -> Result<BusinessHours> {
        Ok(BusinessHours {
            hours: HOURS,
        })
    }
}

// ---------------------------------------------------------------------------
// get_location
// ---------------------------------------------------------------------------

pub struct GetLocation;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub zip_code: &'static str,
    pub country: &'static str,
}

#[async_trait]
impl Tool for GetLocation {
    type Args = NoArgs;
    type Output = Location;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_location",
            "Get the location of the web development agency",
            ParameterSchema::empty(),
        )
    }

    async fn call(&self, _args: NoArgs) -> Result<Location> {
        Ok(Location {
            address: "123 Web Dev Street",
            city: "San Francisco",
            state: "CA",
            zip_code: "94105",
            country: "USA",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::dispatch::execute_call;
    use crate::types::PendingCall;

    fn registry() -> ToolRegistry {
        let mut reg = ToolRegistry::new();
        register_all(&mut reg).unwrap();
        reg
    }

    fn call(name: &str, args: &str) -> PendingCall {
        PendingCall {
            call_id: "call_1".into(),
            tool_name: name.into(),
            raw_arguments: args.into(),
        }
    }

    #[test]
    fn test_advertised_order() {
        let names: Vec<String> = registry().describe_all().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            ["get_services", "get_pricing", "get_business_hours", "get_location"]
        );
    }

    #[tokio::test]
    async fn test_known_and_unknown_pricing() {
        let reg = registry();
        let known = execute_call(&reg, &call("get_pricing", r#"{"service":"Web Design"}"#))
            .await
            .unwrap();
        assert_eq!(known["pricing"], "$1,000 - $5,000");

        let unknown = execute_call(&reg, &call("get_pricing", r#"{"service":"Plumbing"}"#))
            .await
            .unwrap();
        assert_eq!(unknown["service"], "Plumbing");
        assert_eq!(unknown["pricing"], "Pricing not available for this service");
    }

    #[tokio::test]
    async fn test_parameterless_tools() {
        let reg = registry();
        let services = execute_call(&reg, &call("get_services", "{}")).await.unwrap();
        assert_eq!(services["services"].as_array().unwrap().len(), 5);

        let hours = execute_call(&reg, &call("get_business_hours", "")).await.unwrap();
        assert_eq!(hours["hours"]["Saturday"], "Closed");

        let location = execute_call(&reg, &call("get_location", "{}")).await.unwrap();
        assert_eq!(location["zipCode"], "94105");
    }

    #[tokio::test]
    async fn test_payload_keys_keep_declared_order() {
        let reg = registry();
        let outputs = crate::tools::resolve_batch(
            &reg,
            &[call("get_business_hours", ""), call("get_location", "")],
        )
        .await;

        let hours = &outputs[0].payload;
        let monday = hours.find("Monday").unwrap();
        let friday = hours.find("Friday").unwrap();
        let sunday = hours.find("Sunday").unwrap();
        assert!(monday < friday && friday < sunday, "{hours}");

        assert_eq!(
            outputs[1].payload,
            r#"{"address":"123 Web Dev Street","city":"San Francisco","state":"CA","zipCode":"94105","country":"USA"}"#
        );
    }
}
