//! Sample content for the fixture backend.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use folio_core::domain::{Author, Category, Post, PublishState};

use super::Tables;

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn author(name: &str, slug: &str, bio: &str, avatar: &str) -> Author {
    Author {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        bio: Some(bio.to_string()),
        avatar_url: Some(avatar.to_string()),
        created_at: date(2024, 11, 1),
    }
}

fn category(name: &str, slug: &str, description: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: Some(description.to_string()),
        created_at: date(2024, 11, 1),
    }
}

struct SamplePost {
    slug: &'static str,
    title: &'static str,
    excerpt: &'static str,
    body: &'static str,
    image: &'static str,
    tags: [&'static str; 2],
    read_time: u32,
    published: DateTime<Utc>,
}

impl SamplePost {
    fn into_post(self, author: &Author, category: &Category) -> Post {
        Post {
            id: Uuid::new_v4(),
            title: self.title.to_string(),
            slug: self.slug.to_string(),
            excerpt: Some(self.excerpt.to_string()),
            body: self.body.to_string(),
            featured_image_url: Some(self.image.to_string()),
            author_id: Some(author.id),
            category_id: Some(category.id),
            tags: self.tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
            read_time_minutes: self.read_time,
            state: PublishState::Published { at: self.published },
            created_at: self.published,
            updated_at: self.published,
        }
    }
}

pub(super) fn tables() -> Tables {
    let sarah = author(
        "Sarah Chen",
        "sarah-chen",
        "Head of Data Strategy at BeamX Solutions. 10+ years in business intelligence and analytics.",
        "https://images.unsplash.com/photo-1494790108377-be9c29b29330?w=150&h=150&fit=crop&crop=face",
    );
    let michael = author(
        "Michael Torres",
        "michael-torres",
        "Senior AI Engineer specializing in machine learning and predictive analytics.",
        "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150&h=150&fit=crop&crop=face",
    );

    let analytics = category(
        "Data Analytics",
        "data-analytics",
        "Turning raw data into decisions.",
    );
    let ai = category(
        "Artificial Intelligence",
        "artificial-intelligence",
        "Machine learning and automation in practice.",
    );
    let bi = category(
        "Business Intelligence",
        "business-intelligence",
        "Dashboards, reporting and BI platforms.",
    );
    let culture = category(
        "Data Culture",
        "data-culture",
        "People and process behind data-driven teams.",
    );
    let tools = category(
        "Tools & Platforms",
        "tools-platforms",
        "Reviews and comparisons of the data stack.",
    );

    let posts = vec![
        SamplePost {
            slug: "unlocking-business-value-with-data-analytics",
            title: "Unlocking Business Value with Data Analytics: A Complete Guide",
            excerpt: "Discover how modern data analytics can transform raw data into actionable insights that drive business growth and competitive advantage.",
            body: "<h2>Introduction</h2>\
<p>In today's data-driven world, organizations that effectively leverage their data gain significant competitive advantages.</p>\
<h2>The Power of Data Analytics</h2>\
<h3>1. Descriptive Analytics</h3><p>Understanding what happened in your business through historical data analysis.</p>\
<h3>2. Predictive Analytics</h3><p>Using machine learning and statistical models to forecast future outcomes.</p>\
<h3>3. Prescriptive Analytics</h3><p>Recommending specific actions based on data insights.</p>\
<h2>Conclusion</h2><p>Data analytics is no longer optional. Start your journey today.</p>",
            image: "https://images.unsplash.com/photo-1551288049-bebda4e38f71?w=800&h=450&fit=crop",
            tags: ["Data Analytics", "Business Intelligence"],
            read_time: 8,
            published: date(2024, 12, 15),
        }
        .into_post(&sarah, &analytics),
        SamplePost {
            slug: "ai-transforming-business-operations",
            title: "How AI is Transforming Business Operations in 2024",
            excerpt: "Explore the latest AI trends and how they're revolutionizing business processes across industries.",
            body: "<h2>The AI Revolution</h2>\
<p>Artificial Intelligence has moved from buzzword to business essential.</p>\
<h2>Key AI Applications</h2>\
<h3>Process Automation</h3><p>AI-powered automation is handling repetitive tasks, freeing employees for strategic work.</p>\
<h3>Predictive Maintenance</h3><p>Manufacturing and logistics companies use AI to predict equipment failures before they occur.</p>\
<h2>The Future</h2><p>Quality data, clear objectives and thoughtful implementation still decide the outcome.</p>",
            image: "https://images.unsplash.com/photo-1677442136019-21780ecad995?w=800&h=450&fit=crop",
            tags: ["Artificial Intelligence", "Automation"],
            read_time: 6,
            published: date(2024, 12, 10),
        }
        .into_post(&michael, &ai),
        SamplePost {
            slug: "building-data-driven-culture",
            title: "Building a Data-Driven Culture in Your Organization",
            excerpt: "Learn the essential steps to foster a culture where data informs every decision across your organization.",
            body: "<h2>Why Culture Matters</h2>\
<p>Technology alone won't make your organization data-driven.</p>\
<h2>Key Elements</h2>\
<h3>Leadership Buy-In</h3><p>Executives must model data-driven behavior and invest in analytics capabilities.</p>\
<h3>Data Literacy</h3><p>Every employee should understand basic data concepts and how to interpret reports.</p>\
<h2>Conclusion</h2><p>Building a data-driven culture is a journey, not a destination.</p>",
            image: "https://images.unsplash.com/photo-1552664730-d307ca884978?w=800&h=450&fit=crop",
            tags: ["Data Culture", "Leadership"],
            read_time: 5,
            published: date(2024, 12, 5),
        }
        .into_post(&sarah, &culture),
        SamplePost {
            slug: "power-bi-vs-tableau-2024",
            title: "Power BI vs Tableau: Which BI Tool is Right for You in 2024?",
            excerpt: "A comprehensive comparison of the two leading business intelligence platforms to help you make the right choice.",
            body: "<h2>Overview</h2>\
<p>Choosing the right BI tool is crucial for your analytics success.</p>\
<h2>Power BI Strengths</h2><ul><li>Seamless with Excel, Azure and Microsoft 365</li><li>Lower licensing costs</li></ul>\
<h2>Tableau Strengths</h2><ul><li>Superior data visualization</li><li>Large, active user community</li></ul>\
<h2>Our Recommendation</h2><p>There's no one-size-fits-all answer.</p>",
            image: "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=800&h=450&fit=crop",
            tags: ["Business Intelligence", "Tools"],
            read_time: 7,
            published: date(2024, 11, 28),
        }
        .into_post(&michael, &bi),
    ];

    let mut tables = Tables::default();
    for a in [sarah, michael] {
        tables.authors.insert(a.id, a);
    }
    for c in [analytics, ai, bi, culture, tools] {
        tables.categories.insert(c.id, c);
    }
    for p in posts {
        tables.posts.insert(p.id, p);
    }
    tables
}
